//! 文档命令
//!
//! 所有文档变更都表示为一个命名的 `PlanCommand`，由 `PlanStore::dispatch` 统一处理：
//! 校验 → 记录历史快照 → 应用 → 重新计算派生数据（房间面积）。
//! 调用方不能直接修改嵌套数组。

use crate::document::PlanDocument;
use crate::math::Point2;
use crate::model::{
    EntityKind, InfrastructureKind, Level, OpeningKind, Point2D, Point3D, StagingSettings,
    TerrainMesh, ZoneType,
};
use crate::presence::Participant;

/// 整体替换楼层集合的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// 本地编辑
    Local,
    /// 外部生成工具（如 AI 生成户型），与本地编辑同等对待
    Assistant,
    /// 远端广播（最后写入者胜出，不进入撤销历史）
    Remote,
}

/// 被静默吸收的几何拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 零长度墙
    ZeroLengthWall,
    /// 零长度尺寸线
    ZeroLengthDimension,
    /// 路径顶点不足
    DegeneratePath,
}

/// 命令执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// 已应用；新建实体时带有其 id
    Applied { created: Option<String> },
    /// 几何拒绝，文档与历史均未改变
    Ignored(IgnoreReason),
}

impl CommandOutcome {
    pub(crate) fn applied() -> Self {
        CommandOutcome::Applied { created: None }
    }

    pub(crate) fn created(id: String) -> Self {
        CommandOutcome::Applied { created: Some(id) }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            CommandOutcome::Applied { created } => created.as_deref(),
            CommandOutcome::Ignored(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallPatch {
    pub start: Option<Point2>,
    pub end: Option<Point2>,
    pub thickness: Option<f64>,
    pub height: Option<f64>,
    /// `Some(None)` 清除材质
    pub material: Option<Option<String>>,
    pub layer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementPatch {
    pub position_ratio: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub layer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub room_type: Option<String>,
    pub description: Option<String>,
    pub wall_ids: Option<Vec<String>>,
    pub orientation: Option<Option<String>>,
    pub floor_material: Option<Option<String>>,
    pub wall_material_override: Option<Option<String>>,
    pub layer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacedModelPatch {
    pub position: Option<Point2>,
    pub rotation: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub height3d: Option<f64>,
    pub layer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub is_visible: Option<bool>,
    pub is_locked: Option<bool>,
}

/// 文档命令
#[derive(Debug, Clone, PartialEq)]
pub enum PlanCommand {
    // ========== 创建 ==========
    AddWall {
        start: Point2,
        end: Point2,
    },
    /// 未指定尺寸时使用配置中按类型的默认尺寸
    AddPlacement {
        wall_id: String,
        kind: OpeningKind,
        position_ratio: f64,
        width: Option<f64>,
        height: Option<f64>,
    },
    AddPlacedModel {
        model_key: String,
        name: String,
        position: Point2,
        rotation: f64,
        width: f64,
        depth: f64,
        height3d: f64,
    },
    AddDimensionLine {
        p1: Point2,
        p2: Point2,
    },
    AddComment {
        position: Point2,
        text: String,
        author: Participant,
    },
    AddRoom {
        name: String,
        room_type: String,
        wall_ids: Vec<String>,
    },
    AddZone {
        name: String,
        zone_type: ZoneType,
        path: Vec<Point2D>,
    },
    AddInfrastructure {
        kind: InfrastructureKind,
        path: Vec<Point2D>,
        width: Option<f64>,
    },
    AddPropertyLine {
        points: Vec<Point2D>,
    },
    SaveCameraView {
        name: String,
        position: Point3D,
        target: Point3D,
    },

    // ========== 修改 ==========
    UpdateWall {
        id: String,
        patch: WallPatch,
    },
    UpdatePlacement {
        id: String,
        patch: PlacementPatch,
    },
    UpdateRoom {
        id: String,
        patch: RoomPatch,
    },
    UpdatePlacedModel {
        id: String,
        patch: PlacedModelPatch,
    },
    ResolveComment {
        id: String,
        resolved: bool,
    },

    // ========== 删除 ==========
    DeleteEntity {
        kind: EntityKind,
        id: String,
    },

    // ========== 图层与楼层 ==========
    AddLayer {
        name: String,
    },
    UpdateLayer {
        id: String,
        patch: LayerPatch,
    },
    DeleteLayer {
        id: String,
    },
    SetActiveLayer {
        id: String,
    },
    AddLevel {
        name: String,
        elevation: f64,
    },
    SetActiveLevel {
        index: usize,
    },

    // ========== 场地 ==========
    SetPlanNorth(String),
    SetTerrainMesh(Option<TerrainMesh>),
    SetStagingSettings(StagingSettings),

    // ========== 整体替换 ==========
    /// 唯一的“替换楼层集合”入口：本地、外部生成与远端广播共用
    ReplaceLevels {
        levels: Vec<Level>,
        origin: ChangeOrigin,
    },
    NewDocument,
    ImportDocument(Box<PlanDocument>),

    /// 显式重新计算房间面积
    RecomputeRoomAreas,
}

impl PlanCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlanCommand::AddWall { .. } => "AddWall",
            PlanCommand::AddPlacement { .. } => "AddPlacement",
            PlanCommand::AddPlacedModel { .. } => "AddPlacedModel",
            PlanCommand::AddDimensionLine { .. } => "AddDimensionLine",
            PlanCommand::AddComment { .. } => "AddComment",
            PlanCommand::AddRoom { .. } => "AddRoom",
            PlanCommand::AddZone { .. } => "AddZone",
            PlanCommand::AddInfrastructure { .. } => "AddInfrastructure",
            PlanCommand::AddPropertyLine { .. } => "AddPropertyLine",
            PlanCommand::SaveCameraView { .. } => "SaveCameraView",
            PlanCommand::UpdateWall { .. } => "UpdateWall",
            PlanCommand::UpdatePlacement { .. } => "UpdatePlacement",
            PlanCommand::UpdateRoom { .. } => "UpdateRoom",
            PlanCommand::UpdatePlacedModel { .. } => "UpdatePlacedModel",
            PlanCommand::ResolveComment { .. } => "ResolveComment",
            PlanCommand::DeleteEntity { .. } => "DeleteEntity",
            PlanCommand::AddLayer { .. } => "AddLayer",
            PlanCommand::UpdateLayer { .. } => "UpdateLayer",
            PlanCommand::DeleteLayer { .. } => "DeleteLayer",
            PlanCommand::SetActiveLayer { .. } => "SetActiveLayer",
            PlanCommand::AddLevel { .. } => "AddLevel",
            PlanCommand::SetActiveLevel { .. } => "SetActiveLevel",
            PlanCommand::SetPlanNorth(_) => "SetPlanNorth",
            PlanCommand::SetTerrainMesh(_) => "SetTerrainMesh",
            PlanCommand::SetStagingSettings(_) => "SetStagingSettings",
            PlanCommand::ReplaceLevels { .. } => "ReplaceLevels",
            PlanCommand::NewDocument => "NewDocument",
            PlanCommand::ImportDocument(_) => "ImportDocument",
            PlanCommand::RecomputeRoomAreas => "RecomputeRoomAreas",
        }
    }

    /// 是否进入撤销历史
    ///
    /// 切换活动楼层/图层与重新计算面积属于导航或派生操作，远端替换遵循最后写入者胜出。
    pub fn is_recorded(&self) -> bool {
        !matches!(
            self,
            PlanCommand::SetActiveLayer { .. }
                | PlanCommand::SetActiveLevel { .. }
                | PlanCommand::RecomputeRoomAreas
                | PlanCommand::ReplaceLevels {
                    origin: ChangeOrigin::Remote,
                    ..
                }
        )
    }

    pub fn origin(&self) -> ChangeOrigin {
        match self {
            PlanCommand::ReplaceLevels { origin, .. } => *origin,
            _ => ChangeOrigin::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_commands() {
        let add = PlanCommand::AddWall {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.0, 0.0),
        };
        assert!(add.is_recorded());
        assert!(!PlanCommand::SetActiveLevel { index: 0 }.is_recorded());

        let remote = PlanCommand::ReplaceLevels {
            levels: Vec::new(),
            origin: ChangeOrigin::Remote,
        };
        assert!(!remote.is_recorded());
        assert_eq!(remote.origin(), ChangeOrigin::Remote);

        let assistant = PlanCommand::ReplaceLevels {
            levels: Vec::new(),
            origin: ChangeOrigin::Assistant,
        };
        assert!(assistant.is_recorded());
    }

    #[test]
    fn test_outcome_accessors() {
        let created = CommandOutcome::created("wall_1".into());
        assert!(created.is_applied());
        assert_eq!(created.created_id(), Some("wall_1"));
        let ignored = CommandOutcome::Ignored(IgnoreReason::ZeroLengthWall);
        assert!(!ignored.is_applied());
        assert_eq!(ignored.created_id(), None);
    }
}
