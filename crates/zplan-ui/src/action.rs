//! Action 系统
//!
//! 每个草图工具是一个独立的 Action 实现，以状态机处理指针交互。
//! Action 不直接修改文档：它返回 `ActionResult`，由编辑器把命令交给文档存储。

use crate::state::SketchTool;
use std::collections::HashSet;
use zplan_core::config::PlanConfig;
use zplan_core::math::Point2;
use zplan_core::model::{Level, Selection};
use zplan_core::presence::Participant;
use zplan_core::snap::{EditorMode, SnapEngine, SnapPoint, SnapType};
use zplan_core::PlanCommand;

/// Action 执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// 继续当前 action
    Continue,
    /// 提交文档命令；可选地随后切换工具
    Commit {
        command: PlanCommand,
        switch_to: Option<SketchTool>,
    },
    /// 设置（或清除）本地选择
    Select(Option<Selection>),
    /// 取消当前 action
    Cancel,
    /// 切换到另一个工具
    SwitchTo(SketchTool),
}

impl ActionResult {
    pub(crate) fn commit(command: PlanCommand) -> Self {
        ActionResult::Commit {
            command,
            switch_to: None,
        }
    }
}

/// 手势阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Drawing,
}

/// 指针按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// 键盘输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Delete,
    Undo,
    Redo,
    Char(char),
}

/// 预览图形
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewShape {
    /// 进行中的线段（墙、尺寸线）
    Segment {
        from: Point2,
        to: Point2,
        thickness: f64,
    },
    /// 进行中的路径（分区、道路、红线）
    Polyline { points: Vec<Point2>, closed: bool },
    /// 门窗工具悬停的候选宿主墙
    HostWall { wall_id: String },
    /// 捕捉标记
    Marker {
        at: Point2,
        snap: Option<SnapType>,
    },
}

/// Action 上下文：传递给 Action 的运行时信息
pub struct ActionContext<'a> {
    /// 指针的平面坐标
    pub pointer: Point2,
    /// 活动楼层
    pub level: &'a Level,
    pub level_index: usize,
    pub mode: EditorMode,
    pub snap: &'a SnapEngine,
    /// 被远端用户选中的实体
    pub locked_ids: &'a HashSet<String>,
    pub config: &'a PlanConfig,
    pub user: &'a Participant,
}

impl<'a> ActionContext<'a> {
    /// 对指针执行网格 + 端点捕捉
    pub fn snapped(&self) -> SnapPoint {
        self.snap.snap(self.pointer, self.mode, &self.level.walls)
    }

    pub fn snapped_point(&self) -> Point2 {
        self.snapped().point
    }
}

/// Action trait：所有草图工具的核心接口
pub trait Action: Send {
    fn tool(&self) -> SketchTool;

    fn name(&self) -> &str {
        self.tool().name()
    }

    /// 丢弃进行中的手势，不产生任何文档变更
    fn reset(&mut self);

    fn phase(&self) -> GesturePhase {
        GesturePhase::Idle
    }

    // ========== 事件处理 ==========

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult;

    fn on_pointer_move(&mut self, ctx: &ActionContext) -> ActionResult;

    fn on_pointer_up(&mut self, _ctx: &ActionContext, _button: PointerButton) -> ActionResult {
        ActionResult::Continue
    }

    fn on_key(&mut self, _ctx: &ActionContext, _key: Key) -> ActionResult {
        ActionResult::Continue
    }

    // ========== UI 提示 ==========

    fn get_prompt(&self) -> &str;

    // ========== 预览 ==========

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewShape>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use zplan_core::model::Wall;

    /// 测试用上下文数据
    pub struct Fixture {
        pub level: Level,
        pub snap: SnapEngine,
        pub locked: HashSet<String>,
        pub config: PlanConfig,
        pub user: Participant,
        pub mode: EditorMode,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                level: Level::new("level_test", "Ground Floor", 0.0),
                snap: SnapEngine::default(),
                locked: HashSet::new(),
                config: PlanConfig::default(),
                user: Participant::new("local", "Local"),
                mode: EditorMode::Precision,
            }
        }

        pub fn with_wall(mut self, id: &str, a: (f64, f64), b: (f64, f64)) -> Self {
            self.level.walls.push(Wall::new(
                id,
                Point2::new(a.0, a.1),
                Point2::new(b.0, b.1),
                10.0,
                240.0,
                "layer_default",
            ));
            self
        }

        pub fn ctx(&self, x: f64, y: f64) -> ActionContext<'_> {
            ActionContext {
                pointer: Point2::new(x, y),
                level: &self.level,
                level_index: 0,
                mode: self.mode,
                snap: &self.snap,
                locked_ids: &self.locked,
                config: &self.config,
                user: &self.user,
            }
        }
    }
}
