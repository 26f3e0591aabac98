//! 撤销/重做历史
//!
//! 基于快照：每次变更之前保存完整状态的深拷贝。
//! 历史记录不理解实体语义，只处理可克隆的状态。

use std::collections::VecDeque;

/// 默认最大撤销深度
pub const DEFAULT_MAX_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct History<S: Clone> {
    undo_stack: VecDeque<S>,
    redo_stack: Vec<S>,
    max_depth: usize,
}

impl<S: Clone> History<S> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// 在变更之前记录当前状态；清空重做栈，超出深度时丢弃最旧的快照
    pub fn snapshot(&mut self, current: &S) {
        self.record(current.clone());
    }

    /// 记录一个已经取得的变更前状态（调用方自行克隆时使用）
    pub fn record(&mut self, before: S) {
        self.undo_stack.push_back(before);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// 撤销：栈空时返回 false 且不改变状态
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            tracing::debug!("undo stack empty");
            return false;
        };
        let now = std::mem::replace(current, previous);
        self.redo_stack.push(now);
        true
    }

    /// 重做：栈空时返回 false 且不改变状态
    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            tracing::debug!("redo stack empty");
            return false;
        };
        let now = std::mem::replace(current, next);
        self.undo_stack.push_back(now);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<S: Clone> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 模拟一次变更：先快照再修改
    fn apply(history: &mut History<Vec<i32>>, state: &mut Vec<i32>, value: i32) {
        history.snapshot(state);
        state.push(value);
    }

    #[test]
    fn test_undo_restores_state_before_action() {
        let mut h = History::new(10);
        let mut s = Vec::new();
        apply(&mut h, &mut s, 1);
        apply(&mut h, &mut s, 2);
        apply(&mut h, &mut s, 3);
        assert!(h.undo(&mut s));
        assert!(h.undo(&mut s));
        assert_eq!(s, vec![1]);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut h = History::new(10);
        let mut s = Vec::new();
        apply(&mut h, &mut s, 1);
        apply(&mut h, &mut s, 2);
        let after = s.clone();
        assert!(h.undo(&mut s));
        assert!(h.redo(&mut s));
        assert_eq!(s, after);
    }

    #[test]
    fn test_redo_after_fresh_action_is_noop() {
        let mut h = History::new(10);
        let mut s = Vec::new();
        apply(&mut h, &mut s, 1);
        apply(&mut h, &mut s, 2);
        h.undo(&mut s);
        apply(&mut h, &mut s, 5);
        let before = s.clone();
        assert!(!h.redo(&mut s));
        assert_eq!(s, before);
    }

    #[test]
    fn test_underflow_is_noop() {
        let mut h: History<Vec<i32>> = History::default();
        let mut s = vec![7];
        assert!(!h.undo(&mut s));
        assert!(!h.redo(&mut s));
        assert_eq!(s, vec![7]);
    }

    #[test]
    fn test_depth_cap_drops_oldest() {
        let mut h = History::new(3);
        let mut s = Vec::new();
        for i in 0..5 {
            apply(&mut h, &mut s, i);
        }
        assert_eq!(h.undo_len(), 3);
        while h.undo(&mut s) {}
        // 最旧的两个快照已被丢弃
        assert_eq!(s, vec![0, 1]);
    }
}
