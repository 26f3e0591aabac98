//! 文件操作错误定义

use thiserror::Error;
use zplan_core::PlanError;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Version {version} not found for project {project_id}")]
    VersionNotFound { project_id: String, version: u32 },

    #[error(transparent)]
    Plan(#[from] PlanError),
}
