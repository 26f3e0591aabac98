//! ZPlan 核心库
//!
//! 提供户型编辑器的基础设施：
//! - 几何内核（距离、投影、多边形排序与面积）
//! - 参数化文档模型（楼层、墙、房间、门窗、图层……）
//! - 网格/端点捕捉
//! - 基于快照的撤销/重做
//! - 命令/归约器式的文档存储

pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod history;
pub mod id;
pub mod math;
pub mod model;
pub mod notify;
pub mod presence;
pub mod snap;
pub mod store;

pub use command::{ChangeOrigin, CommandOutcome, IgnoreReason, PlanCommand};
pub use config::PlanConfig;
pub use document::PlanDocument;
pub use error::PlanError;
pub use model::{EntityKind, Selection};
pub use store::PlanStore;

/// 重新导出常用类型
pub mod prelude {
    pub use crate::command::*;
    pub use crate::config::PlanConfig;
    pub use crate::document::PlanDocument;
    pub use crate::error::PlanError;
    pub use crate::geometry::*;
    pub use crate::history::History;
    pub use crate::math::*;
    pub use crate::model::*;
    pub use crate::notify::*;
    pub use crate::snap::*;
    pub use crate::store::PlanStore;
}
