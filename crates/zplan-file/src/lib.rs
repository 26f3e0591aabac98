//! ZPlan 文件格式与持久化
//!
//! 支持：
//! - `.zplan` 原生格式（MessagePack + Zstd）
//! - 项目数据 JSON 导入/导出
//! - 本地版本存储与自动保存

pub mod atomic;
pub mod autosave;
pub mod document;
pub mod error;
pub mod json;
pub mod native;
pub mod versions;

pub use autosave::{autosave, AutosaveOutcome};
pub use document::{ProjectFile, ProjectMetadata, ProjectType};
pub use error::FileError;
pub use versions::{CommitKind, LocalVersionStore, Persistence, SavedProject, VersionInfo};
