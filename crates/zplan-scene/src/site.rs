//! 楼板、家具占位、分区与道路的派生

use crate::plan_to_scene;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Serialize;
use zplan_core::geometry::{order_polygon_vertices, polygon_area, unique_vertices, Segment};
use zplan_core::math::{Point2, Point3};
use zplan_core::model::{InfrastructureKind, InfrastructureLine, PlacedModel, Zone, ZoneType};

/// 分区面的离地高度
pub const ZONE_SURFACE_HEIGHT: f64 = 0.5;
/// 道路带的高度与中心离地高度
pub const ROAD_THICKNESS: f64 = 2.0;
pub const ROAD_CENTER_HEIGHT: f64 = 1.0;
/// 未指定宽度时的道路宽度
pub const DEFAULT_ROAD_WIDTH: f64 = 10.0;

/// 房间楼板
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorSurface {
    pub room_id: String,
    /// 按极角排序的轮廓（场景坐标）
    pub outline: Vec<Point3>,
    /// 平面面积
    pub area: f64,
    pub material_key: Option<String>,
}

impl FloorSurface {
    /// 由房间边界墙段构建；唯一顶点少于 3 个时返回 None
    pub fn build(
        room_id: &str,
        segments: &[Segment],
        elevation: f64,
        material_key: Option<String>,
    ) -> Option<Self> {
        if segments.len() < 3 {
            return None;
        }
        let unique = unique_vertices(segments);
        if unique.len() < 3 {
            return None;
        }
        let ordered = order_polygon_vertices(&unique);
        Some(Self {
            room_id: room_id.to_string(),
            area: polygon_area(&ordered),
            outline: ordered.iter().map(|p| plan_to_scene(*p, elevation)).collect(),
            material_key,
        })
    }
}

/// 家具/设备占位盒（视觉参数由素材库按 key 解析）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBlock {
    pub model_id: String,
    pub model_key: String,
    pub pose: Isometry3<f64>,
    /// 尺寸（宽, 高, 深）
    pub size: Vector3<f64>,
}

impl ModelBlock {
    pub fn build(model: &PlacedModel, elevation: f64) -> Self {
        let center = plan_to_scene(model.position(), elevation + model.height3d / 2.0);
        let rotation =
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), model.rotation.to_radians());
        Self {
            model_id: model.id.clone(),
            model_key: model.model_key.clone(),
            pose: Isometry3::from_parts(Translation3::from(center.coords), rotation),
            size: Vector3::new(model.width, model.height3d, model.depth),
        }
    }
}

/// 分区平面
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSurface {
    pub zone_id: String,
    pub zone_type: ZoneType,
    pub outline: Vec<Point3>,
    pub color: u32,
}

impl ZoneSurface {
    pub fn build(zone: &Zone) -> Option<Self> {
        if zone.path.len() < 3 {
            return None;
        }
        Some(Self {
            zone_id: zone.id.clone(),
            zone_type: zone.zone_type,
            outline: zone
                .path
                .iter()
                .map(|p| plan_to_scene(Point2::from(*p), ZONE_SURFACE_HEIGHT))
                .collect(),
            color: zone.zone_type.color(),
        })
    }
}

/// 道路带的一段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RibbonSegment {
    pub center: Point3,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// 绕 y 轴的旋转
    pub rotation_y: f64,
}

/// 道路带
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadRibbon {
    pub road_id: String,
    pub segments: Vec<RibbonSegment>,
}

impl RoadRibbon {
    /// 仅道路生成带状实体；管线等其他类型返回 None
    pub fn build(line: &InfrastructureLine) -> Option<Self> {
        if line.kind != InfrastructureKind::Road || line.path.len() < 2 {
            return None;
        }
        let width = line.width.unwrap_or(DEFAULT_ROAD_WIDTH);
        let segments = line
            .path
            .windows(2)
            .map(|pair| Segment::new(pair[0].into(), pair[1].into()))
            .filter(|seg| !seg.is_degenerate())
            .map(|seg| RibbonSegment {
                center: plan_to_scene(seg.midpoint(), ROAD_CENTER_HEIGHT),
                length: seg.length(),
                width,
                height: ROAD_THICKNESS,
                rotation_y: seg.angle(),
            })
            .collect();
        Some(Self {
            road_id: line.id.clone(),
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zplan_core::model::Point2D;

    fn square(size: f64) -> Vec<Segment> {
        let p = [
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ];
        (0..4).map(|i| Segment::new(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_floor_from_square_room() {
        let floor = FloorSurface::build("r", &square(100.0), 300.0, None).unwrap();
        assert_eq!(floor.outline.len(), 4);
        assert!((floor.area - 10_000.0).abs() < 1e-9);
        assert!(floor.outline.iter().all(|p| p.y == 300.0 && p.z <= 0.0));
    }

    #[test]
    fn test_floor_requires_three_vertices() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let segs = [Segment::new(a, b), Segment::new(b, a), Segment::new(a, b)];
        assert!(FloorSurface::build("r", &segs, 0.0, None).is_none());
    }

    #[test]
    fn test_road_ribbon() {
        let road = InfrastructureLine {
            id: "road".into(),
            kind: InfrastructureKind::Road,
            path: vec![Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0), Point2D::new(100.0, 50.0)],
            width: None,
            layer_id: "l".into(),
        };
        let ribbon = RoadRibbon::build(&road).unwrap();
        assert_eq!(ribbon.segments.len(), 2);
        let first = &ribbon.segments[0];
        assert_eq!(first.center, Point3::new(50.0, 1.0, -0.0));
        assert_eq!(first.width, DEFAULT_ROAD_WIDTH);
        assert_eq!(first.height, 2.0);
        assert!((ribbon.segments[1].rotation_y - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let utility = InfrastructureLine {
            kind: InfrastructureKind::UtilityLine,
            ..road
        };
        assert!(RoadRibbon::build(&utility).is_none());
    }

    #[test]
    fn test_zone_surface_color_and_height() {
        let zone = Zone {
            id: "z".into(),
            name: "Park".into(),
            zone_type: ZoneType::GreenSpace,
            path: vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(10.0, 10.0)],
            layer_id: "l".into(),
        };
        let surface = ZoneSurface::build(&zone).unwrap();
        assert_eq!(surface.color, 0x10b981);
        assert!(surface.outline.iter().all(|p| p.y == ZONE_SURFACE_HEIGHT));
    }

    #[test]
    fn test_model_block_sits_on_floor() {
        let model = PlacedModel {
            id: "m".into(),
            model_key: "bed_queen".into(),
            name: "Bed".into(),
            x: 50.0,
            y: 60.0,
            width: 160.0,
            depth: 200.0,
            height3d: 50.0,
            rotation: 0.0,
            layer_id: "l".into(),
            brand: None,
            style: None,
        };
        let block = ModelBlock::build(&model, 300.0);
        let center = block.pose * Point3::origin();
        assert_eq!(center, Point3::new(50.0, 325.0, -60.0));
    }
}
