use serde::{Deserialize, Serialize};

/// 门窗类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpeningKind::Door => "门",
            OpeningKind::Window => "窗",
        }
    }
}

/// 门窗：以比例锚定在宿主墙上
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    pub wall_id: String,
    #[serde(rename = "type")]
    pub kind: OpeningKind,
    /// 距墙起点的长度比例，[0, 1]
    pub position_ratio: f64,
    pub width: f64,
    pub height: f64,
    pub layer_id: String,
}

impl Placement {
    /// 在长度为 `wall_length` 的墙上所占的区间 `[start, end]`（未钳制）
    pub fn interval(&self, wall_length: f64) -> (f64, f64) {
        let center = self.position_ratio * wall_length;
        (center - self.width / 2.0, center + self.width / 2.0)
    }

    /// 与另一门窗在同一墙上的区间是否重叠
    pub fn overlaps(&self, other: &Placement, wall_length: f64) -> bool {
        let (a0, a1) = self.interval(wall_length);
        let (b0, b1) = other.interval(wall_length);
        a0 < b1 && b0 < a1
    }
}
