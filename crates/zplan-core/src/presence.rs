//! 协作者在线状态
//!
//! 远端用户的光标与选择，按用户 id 索引，只保存在内存中。
//! 远端选择即“软锁”：被他人选中的实体在本地不可交互。

use crate::math::Point2;
use crate::model::{EntityKind, Selection};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// 用户显示颜色调色板
const USER_COLORS: [&str; 10] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#14b8a6", "#3b82f6", "#6366f1", "#a855f7",
    "#ec4899", "#84cc16",
];

/// 由用户 id 确定性地选择显示颜色（FNV-1a）
pub fn color_for_user(user_id: &str) -> &'static str {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in user_id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    USER_COLORS[(hash as usize) % USER_COLORS.len()]
}

/// 参与者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub user_name: String,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

/// 远端光标
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCursor {
    pub position: Point2,
    pub user_name: String,
    pub color: &'static str,
}

/// 远端选择
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSelection {
    pub user_id: String,
    pub object_id: String,
    pub object_type: EntityKind,
}

/// 远端协作者的光标与选择
///
/// 存活按用户计：该用户的任何入站事件都会刷新时间戳，
/// 超时后一并清除其光标与选择。
#[derive(Debug, Clone)]
pub struct Presence {
    cursors: HashMap<String, LiveCursor>,
    selections: HashMap<String, LiveSelection>,
    last_seen: HashMap<String, Instant>,
    timeout: Duration,
}

impl Presence {
    pub fn new(timeout: Duration) -> Self {
        Self {
            cursors: HashMap::new(),
            selections: HashMap::new(),
            last_seen: HashMap::new(),
            timeout,
        }
    }

    /// 记录用户仍在线
    pub fn touch(&mut self, user_id: &str, now: Instant) {
        self.last_seen.insert(user_id.to_string(), now);
    }

    pub fn update_cursor(&mut self, user_id: &str, user_name: &str, position: Point2, now: Instant) {
        self.touch(user_id, now);
        self.cursors.insert(
            user_id.to_string(),
            LiveCursor {
                position,
                user_name: user_name.to_string(),
                color: color_for_user(user_id),
            },
        );
    }

    /// 更新远端选择；`None` 表示对方取消了选择
    pub fn update_selection(&mut self, user_id: &str, selection: Option<&Selection>, now: Instant) {
        self.touch(user_id, now);
        match selection {
            Some(sel) => {
                self.selections.insert(
                    user_id.to_string(),
                    LiveSelection {
                        user_id: user_id.to_string(),
                        object_id: sel.id.clone(),
                        object_type: sel.kind,
                    },
                );
            }
            None => {
                self.selections.remove(user_id);
            }
        }
    }

    pub fn remove_user(&mut self, user_id: &str) {
        self.cursors.remove(user_id);
        self.selections.remove(user_id);
        self.last_seen.remove(user_id);
    }

    /// 清除超过存活时间没有任何消息的用户，返回被清除的用户 id
    pub fn evict_stale(&mut self, now: Instant) -> Vec<String> {
        let timeout = self.timeout;
        let mut evicted: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) > timeout)
            .map(|(user, _)| user.clone())
            .collect();
        evicted.sort();
        for user in &evicted {
            self.remove_user(user);
        }
        evicted
    }

    /// 被本地用户以外的人选中的实体 id
    pub fn locked_ids(&self, local_user_id: &str) -> HashSet<String> {
        self.selections
            .values()
            .filter(|s| s.user_id != local_user_id && !s.object_id.is_empty())
            .map(|s| s.object_id.clone())
            .collect()
    }

    /// 按用户 id 排序的远端光标
    pub fn cursors(&self) -> Vec<(&str, &LiveCursor)> {
        let mut out: Vec<_> = self
            .cursors
            .iter()
            .map(|(id, cursor)| (id.as_str(), cursor))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_deterministic() {
        assert_eq!(color_for_user("alice"), color_for_user("alice"));
        assert!(USER_COLORS.contains(&color_for_user("bob")));
    }

    #[test]
    fn test_soft_lock_excludes_local_user() {
        let mut p = Presence::default();
        let now = Instant::now();
        let sel = Selection::new("wall_1", EntityKind::Wall, 0);
        p.update_selection("userB", Some(&sel), now);
        assert!(p.locked_ids("userA").contains("wall_1"));
        assert!(p.locked_ids("userB").is_empty());

        p.update_selection("userB", None, now);
        assert!(p.locked_ids("userA").is_empty());
    }

    #[test]
    fn test_evict_stale_entries() {
        let mut p = Presence::new(Duration::from_secs(30));
        let t0 = Instant::now();
        p.update_cursor("old", "Old", Point2::new(1.0, 2.0), t0);
        p.update_cursor("fresh", "Fresh", Point2::new(3.0, 4.0), t0 + Duration::from_secs(20));
        let evicted = p.evict_stale(t0 + Duration::from_secs(31));
        assert_eq!(evicted, vec!["old".to_string()]);
        assert_eq!(p.cursors().len(), 1);
        assert_eq!(p.cursors()[0].1.user_name, "Fresh");
    }

    #[test]
    fn test_cursor_traffic_keeps_soft_lock_alive() {
        let mut p = Presence::new(Duration::from_secs(30));
        let t0 = Instant::now();
        let sel = Selection::new("wall_1", EntityKind::Wall, 0);
        p.update_selection("them", Some(&sel), t0);
        for secs in [10, 20, 29] {
            p.update_cursor("them", "Them", Point2::new(1.0, 1.0), t0 + Duration::from_secs(secs));
        }

        let evicted = p.evict_stale(t0 + Duration::from_secs(31));
        assert!(evicted.is_empty());
        assert!(p.locked_ids("me").contains("wall_1"));

        // 用户沉默超时后光标与选择一起清除
        let evicted = p.evict_stale(t0 + Duration::from_secs(60));
        assert_eq!(evicted, vec!["them".to_string()]);
        assert!(p.locked_ids("me").is_empty());
        assert!(p.cursors().is_empty());
    }

    #[test]
    fn test_touch_refreshes_liveness() {
        let mut p = Presence::new(Duration::from_secs(30));
        let t0 = Instant::now();
        let sel = Selection::new("wall_1", EntityKind::Wall, 0);
        p.update_selection("them", Some(&sel), t0);
        p.touch("them", t0 + Duration::from_secs(25));
        assert!(p.evict_stale(t0 + Duration::from_secs(40)).is_empty());
        assert!(p.locked_ids("me").contains("wall_1"));
    }
}
