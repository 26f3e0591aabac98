use crate::geometry::Segment;
use crate::math::Point2;
use serde::{Deserialize, Serialize};

/// 墙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub thickness: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub layer_id: String,
}

impl Wall {
    pub fn new(
        id: impl Into<String>,
        start: Point2,
        end: Point2,
        thickness: f64,
        height: f64,
        layer_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            thickness,
            height,
            material: None,
            layer_id: layer_id.into(),
        }
    }

    pub fn start(&self) -> Point2 {
        Point2::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point2 {
        Point2::new(self.x2, self.y2)
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.start(), self.end())
    }

    pub fn length(&self) -> f64 {
        self.segment().length()
    }

    /// 与 x 轴夹角（弧度）
    pub fn angle(&self) -> f64 {
        self.segment().angle()
    }

    pub fn endpoints(&self) -> [Point2; 2] {
        [self.start(), self.end()]
    }
}
