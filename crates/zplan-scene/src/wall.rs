//! 墙体开洞分段
//!
//! 沿墙长度把墙切成交替的实体段与洞口：
//! 1. 计算每个门窗的区间并按起点排序（区间钳制到墙长内，重叠部分向后截断）
//! 2. 从左到右：洞口前的空隙不小于 `MIN_SEGMENT` 时生成实体段；
//!    墙高减洞口高大于 `MIN_SEGMENT` 时生成过梁；游标移到洞口终点
//! 3. 最后剩余长度生成收尾实体段
//!
//! 局部坐标：x 沿墙方向（原点在墙中点），y 向上（原点在墙底），z 为厚度方向。

use crate::plan_to_scene;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Serialize;
use zplan_core::math::Point3;
use zplan_core::model::{Placement, Wall};

/// 最小实体段长度 / 最小过梁高度
pub const MIN_SEGMENT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartKind {
    /// 实体墙段
    Segment,
    /// 洞口上方的过梁
    Lintel,
}

/// 墙体部件（局部坐标的长方体）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallPart {
    pub kind: PartKind,
    /// 沿墙方向距起点的区间
    pub from: f64,
    pub to: f64,
    /// 局部中心
    pub center: Point3,
    /// 尺寸（长, 高, 厚）
    pub size: Vector3<f64>,
}

impl WallPart {
    pub fn length(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }
}

/// 已定位的墙体组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallAssembly {
    pub wall_id: String,
    /// 局部 → 场景的位姿：平移到墙中点（楼层标高处），绕 y 轴旋转到墙角度
    pub pose: Isometry3<f64>,
    pub parts: Vec<WallPart>,
    pub material_key: Option<String>,
}

impl WallAssembly {
    /// 由墙与其门窗构建
    pub fn build(wall: &Wall, openings: &[&Placement], elevation: f64) -> Self {
        let midpoint = wall.segment().midpoint();
        let origin = plan_to_scene(midpoint, elevation);
        // 平面 y 轴翻转为场景 -z 后，平面中的逆时针角对应绕 y 轴的正向旋转
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), wall.angle());
        Self {
            wall_id: wall.id.clone(),
            pose: Isometry3::from_parts(Translation3::from(origin.coords), rotation),
            parts: segment_wall(wall, openings),
            material_key: wall.material.clone(),
        }
    }

    /// 部件中心的场景坐标
    pub fn world_center(&self, part: &WallPart) -> Point3 {
        self.pose * part.center
    }
}

/// 把墙切分为实体段与过梁（局部坐标）
pub fn segment_wall(wall: &Wall, openings: &[&Placement]) -> Vec<WallPart> {
    let length = wall.length();
    let height = wall.height;
    let thickness = wall.thickness;

    let mut intervals: Vec<(f64, f64, f64)> = openings
        .iter()
        .map(|p| {
            let (start, end) = p.interval(length);
            (start.clamp(0.0, length), end.clamp(0.0, length), p.height)
        })
        .filter(|(start, end, _)| end > start)
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let make = |kind: PartKind, from: f64, to: f64, bottom: f64, top: f64| WallPart {
        kind,
        from,
        to,
        center: Point3::new((from + to) / 2.0 - length / 2.0, (bottom + top) / 2.0, 0.0),
        size: Vector3::new(to - from, top - bottom, thickness),
    };

    let mut parts = Vec::new();
    let mut cursor = 0.0_f64;
    for (start, end, opening_height) in intervals {
        let start = start.max(cursor);
        if end <= start {
            tracing::debug!("opening fully covered by a previous one on wall {}", wall.id);
            continue;
        }
        if start - cursor >= MIN_SEGMENT {
            parts.push(make(PartKind::Segment, cursor, start, 0.0, height));
        }
        if height - opening_height > MIN_SEGMENT {
            parts.push(make(PartKind::Lintel, start, end, opening_height, height));
        }
        cursor = end;
    }
    if length - cursor >= MIN_SEGMENT {
        parts.push(make(PartKind::Segment, cursor, length, 0.0, height));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use zplan_core::math::Point2;
    use zplan_core::model::OpeningKind;

    fn wall(len: f64, height: f64) -> Wall {
        Wall::new("w", Point2::new(0.0, 0.0), Point2::new(len, 0.0), 10.0, height, "l")
    }

    fn opening(ratio: f64, width: f64, height: f64) -> Placement {
        Placement {
            id: format!("p{}", ratio),
            wall_id: "w".into(),
            kind: OpeningKind::Door,
            position_ratio: ratio,
            width,
            height,
            layer_id: "l".into(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plain_wall_is_one_segment() {
        let parts = segment_wall(&wall(300.0, 240.0), &[]);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind, PartKind::Segment);
        assert!(approx(parts[0].length(), 300.0));
        assert!(approx(parts[0].center.x, 0.0));
        assert!(approx(parts[0].center.y, 120.0));
    }

    #[test]
    fn test_door_splits_wall_with_lintel() {
        let door = opening(0.5, 90.0, 210.0);
        let parts = segment_wall(&wall(300.0, 240.0), &[&door]);
        let kinds: Vec<PartKind> = parts.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PartKind::Segment, PartKind::Lintel, PartKind::Segment]);
        assert!(approx(parts[0].to, 105.0));
        let lintel = &parts[1];
        assert!(approx(lintel.height(), 30.0));
        assert!(approx(lintel.center.y, 225.0));
        assert!(approx(lintel.length(), 90.0));
        assert!(approx(parts[2].from, 195.0));
    }

    #[test]
    fn test_lintel_height_is_wall_minus_opening() {
        for h in [0.0, 100.0, 200.0, 239.0, 239.85, 239.95, 240.0] {
            let o = opening(0.5, 60.0, h);
            let parts = segment_wall(&wall(300.0, 240.0), &[&o]);
            let lintel = parts.iter().find(|p| p.kind == PartKind::Lintel);
            if 240.0 - h > MIN_SEGMENT {
                assert!(approx(lintel.unwrap().height(), 240.0 - h));
            } else {
                assert!(lintel.is_none(), "lintel should be omitted for h={}", h);
            }
        }
    }

    #[test]
    fn test_openings_sorted_and_gaps() {
        let a = opening(0.75, 60.0, 100.0);
        let b = opening(0.25, 60.0, 100.0);
        let parts = segment_wall(&wall(400.0, 240.0), &[&a, &b]);
        let segments: Vec<(f64, f64)> = parts
            .iter()
            .filter(|p| p.kind == PartKind::Segment)
            .map(|p| (p.from, p.to))
            .collect();
        assert_eq!(segments, vec![(0.0, 70.0), (130.0, 270.0), (330.0, 400.0)]);
    }

    #[test]
    fn test_opening_at_wall_end_clamped() {
        let o = opening(1.0, 90.0, 210.0);
        let parts = segment_wall(&wall(200.0, 240.0), &[&o]);
        assert_eq!(parts.len(), 2);
        assert!(approx(parts[0].to, 155.0));
        assert_eq!(parts[1].kind, PartKind::Lintel);
        assert!(approx(parts[1].to, 200.0));
    }

    #[test]
    fn test_overlapping_openings_clamped() {
        let a = opening(0.5, 100.0, 210.0);
        let b = opening(0.6, 100.0, 210.0);
        let parts = segment_wall(&wall(300.0, 240.0), &[&a, &b]);
        let total: f64 = parts
            .iter()
            .filter(|p| p.kind == PartKind::Lintel)
            .map(|p| p.length())
            .sum();
        // 两个洞口合并覆盖 [100, 230]
        assert!(approx(total, 130.0));
        for w in parts.windows(2) {
            assert!(w[0].to <= w[1].from + 1e-9);
        }
    }

    #[test]
    fn test_tiny_gap_skipped() {
        // 洞口起点距墙起点 0.05 < MIN_SEGMENT
        let o = opening(45.05 / 300.0, 90.0, 210.0);
        let parts = segment_wall(&wall(300.0, 240.0), &[&o]);
        assert_eq!(parts[0].kind, PartKind::Lintel);
    }

    #[test]
    fn test_assembly_pose_maps_ends() {
        let w = Wall::new("w", Point2::new(10.0, 20.0), Point2::new(110.0, 120.0), 10.0, 240.0, "l");
        let assembly = WallAssembly::build(&w, &[], 300.0);
        let half = w.length() / 2.0;
        let end = assembly.pose * Point3::new(half, 0.0, 0.0);
        let start = assembly.pose * Point3::new(-half, 0.0, 0.0);
        assert!((end - Point3::new(110.0, 300.0, -120.0)).norm() < 1e-9);
        assert!((start - Point3::new(10.0, 300.0, -20.0)).norm() < 1e-9);
        let center = assembly.world_center(&assembly.parts[0]);
        assert!((center - Point3::new(60.0, 420.0, -70.0)).norm() < 1e-9);
    }
}
