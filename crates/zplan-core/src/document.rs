//! 可撤销的文档聚合
//!
//! `PlanDocument` 就是撤销历史里保存的完整快照：楼层与项目级场地数据。
//! 选择、工具、远端光标等会话状态不在这里。

use crate::id::generate_id;
use crate::model::{
    CameraView, EntityKind, InfrastructureLine, Level, PropertyLine, Selection, StagingSettings,
    TerrainMesh, Zone,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub levels: Vec<Level>,
    pub active_level_index: usize,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub infrastructure: Vec<InfrastructureLine>,
    #[serde(default = "default_north")]
    pub plan_north_direction: String,
    #[serde(default)]
    pub property_lines: Vec<PropertyLine>,
    #[serde(default)]
    pub terrain_mesh: Option<TerrainMesh>,
    #[serde(default)]
    pub staging_settings: StagingSettings,
    #[serde(default)]
    pub saved_camera_views: Vec<CameraView>,
}

fn default_north() -> String {
    "up".to_string()
}

impl PlanDocument {
    /// 新项目：一个“Ground Floor”楼层（标高 0，默认图层）
    pub fn new() -> Self {
        Self {
            levels: vec![Level::new(generate_id("level"), "Ground Floor", 0.0)],
            active_level_index: 0,
            zones: Vec::new(),
            infrastructure: Vec::new(),
            plan_north_direction: default_north(),
            property_lines: Vec::new(),
            terrain_mesh: None,
            staging_settings: StagingSettings::default(),
            saved_camera_views: Vec::new(),
        }
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.levels.get(self.active_level_index)
    }

    pub fn active_level_mut(&mut self) -> Option<&mut Level> {
        self.levels.get_mut(self.active_level_index)
    }

    /// 当前楼层下方一层（作为底图）
    pub fn underlay_level(&self) -> Option<&Level> {
        self.active_level_index
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
    }

    /// 将活动楼层索引钳制到合法范围
    pub fn clamp_active_level(&mut self) {
        if self.active_level_index >= self.levels.len() {
            self.active_level_index = self.levels.len().saturating_sub(1);
        }
    }

    /// 选择所指的实体是否仍然存在
    pub fn contains(&self, selection: &Selection) -> bool {
        let id = selection.id.as_str();
        if !selection.kind.is_level_scoped() {
            return match selection.kind {
                EntityKind::Zone => self.zones.iter().any(|z| z.id == id),
                EntityKind::Infrastructure => self.infrastructure.iter().any(|i| i.id == id),
                EntityKind::PropertyLine => self.property_lines.iter().any(|p| p.id == id),
                _ => false,
            };
        }
        let Some(level) = self.levels.get(selection.level_index) else {
            return false;
        };
        match selection.kind {
            EntityKind::Wall => level.walls.iter().any(|e| e.id == id),
            EntityKind::Room => level.rooms.iter().any(|e| e.id == id),
            EntityKind::Placement => level.placements.iter().any(|e| e.id == id),
            EntityKind::PlacedModel => level.placed_models.iter().any(|e| e.id == id),
            EntityKind::DimensionLine => level.dimension_lines.iter().any(|e| e.id == id),
            EntityKind::Comment => level.comments.iter().any(|e| e.id == id),
            _ => false,
        }
    }

    pub fn wall_count(&self) -> usize {
        self.levels.iter().map(|l| l.walls.len()).sum()
    }
}

impl Default for PlanDocument {
    fn default() -> Self {
        Self::new()
    }
}
