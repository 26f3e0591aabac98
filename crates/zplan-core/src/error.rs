//! 文档操作错误定义

use crate::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("{} not found: {id}", .kind.name())]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Cannot delete the last layer.")]
    LastLayer,

    #[error("Wall {wall_id} is used by room(s): {}", .rooms.join(", "))]
    WallInUse { wall_id: String, rooms: Vec<String> },

    #[error("Level index {index} out of range (levels: {count})")]
    LevelOutOfRange { index: usize, count: usize },

    #[error("A project must contain at least one level")]
    EmptyLevels,

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl PlanError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        PlanError::EntityNotFound {
            kind,
            id: id.into(),
        }
    }
}
