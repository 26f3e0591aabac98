//! 参数化文档模型
//!
//! 实体之间以字符串 id 相互引用（墙 ↔ 房间 ↔ 门窗），
//! 快照可以廉价深拷贝，序列化也不会出现环。

mod annotation;
mod layer;
mod level;
mod placement;
mod room;
mod site;
mod wall;

pub use annotation::{Comment, CommentReply, DimensionKind, DimensionLine, PlacedModel};
pub use layer::{Layer, DEFAULT_LAYER_ID};
pub use level::{Level, MepLayouts};
pub use placement::{OpeningKind, Placement};
pub use room::Room;
pub use site::{
    CameraView, InfrastructureKind, InfrastructureLine, PropertyLine, StagingSettings,
    TerrainMesh, TimeOfDay, Zone, ZoneType,
};
pub use wall::Wall;

use crate::math::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// 可序列化的平面点（线格式为 `{x, y}`）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for Point2D {
    fn from(p: Point2) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point2D> for Point2 {
    fn from(p: Point2D) -> Self {
        Point2::new(p.x, p.y)
    }
}

/// 可序列化的三维点（相机视角）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Point3> for Point3D {
    fn from(p: Point3) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

/// 可选中/可删除的实体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Wall,
    Room,
    Placement,
    PlacedModel,
    DimensionLine,
    Comment,
    Zone,
    Infrastructure,
    PropertyLine,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Wall => "wall",
            EntityKind::Room => "room",
            EntityKind::Placement => "placement",
            EntityKind::PlacedModel => "placedModel",
            EntityKind::DimensionLine => "dimensionLine",
            EntityKind::Comment => "comment",
            EntityKind::Zone => "zone",
            EntityKind::Infrastructure => "infrastructure",
            EntityKind::PropertyLine => "propertyLine",
        }
    }

    /// 是否属于楼层（其余为项目级场地数据）
    pub fn is_level_scoped(&self) -> bool {
        !matches!(
            self,
            EntityKind::Zone | EntityKind::Infrastructure | EntityKind::PropertyLine
        )
    }
}

/// 本地用户当前聚焦的实体（临时状态，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub level_index: usize,
}

impl Selection {
    pub fn new(id: impl Into<String>, kind: EntityKind, level_index: usize) -> Self {
        Self {
            id: id.into(),
            kind,
            level_index,
        }
    }
}
