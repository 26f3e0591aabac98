use super::{Comment, DimensionLine, Layer, PlacedModel, Placement, Room, Wall};
use serde::{Deserialize, Serialize};

/// 机电布置（由外部工具生成，核心只负责透传）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MepLayouts {
    #[serde(default)]
    pub plumbing: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electrical: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hvac: Option<serde_json::Value>,
}

/// 楼层：一层的全部可绘制实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    pub name: String,
    pub elevation: f64,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub placed_models: Vec<PlacedModel>,
    #[serde(default)]
    pub dimension_lines: Vec<DimensionLine>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub mep: MepLayouts,
    pub layers: Vec<Layer>,
    pub active_layer_id: String,
}

impl Level {
    /// 新楼层：带一个默认图层
    pub fn new(id: impl Into<String>, name: impl Into<String>, elevation: f64) -> Self {
        let layer = Layer::default();
        let active_layer_id = layer.id.clone();
        Self {
            id: id.into(),
            name: name.into(),
            elevation,
            walls: Vec::new(),
            rooms: Vec::new(),
            placements: Vec::new(),
            placed_models: Vec::new(),
            dimension_lines: Vec::new(),
            comments: Vec::new(),
            mep: MepLayouts::default(),
            layers: vec![layer],
            active_layer_id,
        }
    }

    pub fn wall(&self, id: &str) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn wall_mut(&mut self, id: &str) -> Option<&mut Wall> {
        self.walls.iter_mut().find(|w| w.id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// 实体所在图层是否允许交互；未知图层视为可交互
    pub fn is_layer_interactive(&self, layer_id: &str) -> bool {
        self.layer(layer_id).map_or(true, Layer::is_interactive)
    }

    pub fn is_layer_visible(&self, layer_id: &str) -> bool {
        self.layer(layer_id).map_or(true, |l| l.is_visible)
    }

    /// 宿主墙上的所有门窗
    pub fn placements_on<'a>(&'a self, wall_id: &'a str) -> impl Iterator<Item = &'a Placement> + 'a {
        self.placements.iter().filter(move |p| p.wall_id == wall_id)
    }

    /// 引用某墙的所有房间 id
    pub fn rooms_referencing(&self, wall_id: &str) -> Vec<String> {
        self.rooms
            .iter()
            .filter(|r| r.references_wall(wall_id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// 房间边界墙段（忽略已不存在的墙 id）
    pub fn room_segments(&self, room: &super::Room) -> Vec<crate::geometry::Segment> {
        room.wall_ids
            .iter()
            .filter_map(|id| self.wall(id))
            .map(Wall::segment)
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.walls.len()
            + self.rooms.len()
            + self.placements.len()
            + self.placed_models.len()
            + self.dimension_lines.len()
            + self.comments.len()
    }
}
