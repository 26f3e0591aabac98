//! 同步错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not connected to a project channel")]
    NotConnected,

    #[error("Channel closed")]
    Disconnected,

    #[error("Receiver lagged, {0} messages dropped")]
    Lagged(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
