//! 线上事件格式
//!
//! JSON 帧：`{"projectId": .., "sender": .., "event": "<snake_case>", "data": {..}}`，
//! 载荷字段为 camelCase。

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use zplan_core::model::{Level, Point2D, Selection};
use zplan_core::presence::Participant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum SyncEvent {
    JoinProject {
        project_id: String,
        user: Participant,
    },
    LeaveProject {
        project_id: String,
        user_id: String,
    },
    GeometryUpdate {
        levels: Vec<Level>,
    },
    CursorUpdate {
        user_id: String,
        user_name: String,
        position: Point2D,
    },
    SelectionUpdate {
        user_id: String,
        selection: Option<Selection>,
    },
    RequestGeometry {
        user_id: String,
    },
    ErrorMessage {
        message: String,
    },
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::JoinProject { .. } => "join_project",
            SyncEvent::LeaveProject { .. } => "leave_project",
            SyncEvent::GeometryUpdate { .. } => "geometry_update",
            SyncEvent::CursorUpdate { .. } => "cursor_update",
            SyncEvent::SelectionUpdate { .. } => "selection_update",
            SyncEvent::RequestGeometry { .. } => "request_geometry",
            SyncEvent::ErrorMessage { .. } => "error_message",
        }
    }
}

/// 带路由信息的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub project_id: String,
    pub sender: String,
    #[serde(flatten)]
    pub event: SyncEvent,
}

impl Envelope {
    pub fn new(project_id: impl Into<String>, sender: impl Into<String>, event: SyncEvent) -> Self {
        Self {
            project_id: project_id.into(),
            sender: sender.into(),
            event,
        }
    }

    pub fn encode(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(frame)?)
    }
}
