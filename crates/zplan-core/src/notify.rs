//! 用户通知与保存状态

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 通知默认显示时长
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created: Instant,
}

/// 通知队列
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let message = message.into();
        tracing::debug!("notification[{:?}]: {}", kind, message);
        self.queue.push_back(Notification {
            id: self.next_id,
            kind,
            message,
            created: Instant::now(),
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Warning, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.queue.retain(|n| n.id != id);
    }

    /// 移除超过 `NOTIFICATION_TTL` 的通知
    pub fn prune(&mut self, now: Instant) {
        self.queue
            .retain(|n| now.saturating_duration_since(n.created) < NOTIFICATION_TTL);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }
}

/// 保存状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

impl SaveStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut n = Notifications::new();
        n.success("Saved");
        let id = n.error("Failed");
        assert_eq!(n.len(), 2);
        assert_eq!(n.last().map(|x| x.kind), Some(NotificationKind::Error));
        n.dismiss(id);
        assert_eq!(n.len(), 1);
        assert_eq!(n.drain().len(), 1);
        assert!(n.is_empty());
    }

    #[test]
    fn test_prune_expired() {
        let mut n = Notifications::new();
        n.info("hello");
        n.prune(Instant::now());
        assert_eq!(n.len(), 1);
        n.prune(Instant::now() + NOTIFICATION_TTL + Duration::from_millis(1));
        assert!(n.is_empty());
    }
}
