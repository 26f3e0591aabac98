//! 绘制墙体 Action

use super::drag::DragGesture;
use crate::action::{Action, ActionContext, ActionResult, GesturePhase, PointerButton, PreviewShape};
use crate::state::SketchTool;
use zplan_core::PlanCommand;

/// 绘制墙体：按下确定起点，拖动实时捕捉，释放生成墙体
pub struct DrawWallAction {
    drag: DragGesture,
}

impl DrawWallAction {
    pub fn new() -> Self {
        Self {
            drag: DragGesture::new(),
        }
    }
}

impl Default for DrawWallAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawWallAction {
    fn tool(&self) -> SketchTool {
        SketchTool::Wall
    }

    fn reset(&mut self) {
        self.drag.reset();
    }

    fn phase(&self) -> GesturePhase {
        if self.drag.is_dragging() {
            GesturePhase::Drawing
        } else {
            GesturePhase::Idle
        }
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        match button {
            PointerButton::Primary => {
                self.drag.begin(ctx);
                ActionResult::Continue
            }
            // 右键：拖动中放弃当前墙体，否则退出工具
            PointerButton::Secondary if self.drag.is_dragging() => {
                self.drag.reset();
                ActionResult::Continue
            }
            PointerButton::Secondary => ActionResult::Cancel,
        }
    }

    fn on_pointer_move(&mut self, ctx: &ActionContext) -> ActionResult {
        self.drag.update(ctx);
        ActionResult::Continue
    }

    fn on_pointer_up(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        if button != PointerButton::Primary {
            return ActionResult::Continue;
        }
        match self.drag.finish(ctx) {
            Some((start, end)) => ActionResult::commit(PlanCommand::AddWall { start, end }),
            None => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        if self.drag.is_dragging() {
            "拖动到墙体终点后释放:"
        } else {
            "按下指定墙体起点:"
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewShape> {
        self.drag.preview(ctx, ctx.config.wall_thickness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::Fixture;
    use zplan_core::math::Point2;

    #[test]
    fn test_precision_drag_snaps_to_grid() {
        let fx = Fixture::new();
        let mut action = DrawWallAction::new();

        action.on_pointer_down(&fx.ctx(1.0, -2.0), PointerButton::Primary);
        assert_eq!(action.phase(), GesturePhase::Drawing);
        action.on_pointer_move(&fx.ctx(60.0, 1.0));

        let result = action.on_pointer_up(&fx.ctx(98.0, 3.0), PointerButton::Primary);
        assert_eq!(
            result,
            ActionResult::commit(PlanCommand::AddWall {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(100.0, 0.0),
            })
        );
        assert_eq!(action.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_zero_length_drag_is_discarded() {
        let fx = Fixture::new();
        let mut action = DrawWallAction::new();

        action.on_pointer_down(&fx.ctx(40.0, 40.0), PointerButton::Primary);
        let result = action.on_pointer_up(&fx.ctx(41.0, 39.0), PointerButton::Primary);
        assert_eq!(result, ActionResult::Continue);
        assert_eq!(action.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_end_snaps_to_existing_endpoint() {
        let fx = Fixture::new().with_wall("w1", (0.0, 0.0), (203.0, 0.0));
        let mut action = DrawWallAction::new();

        action.on_pointer_down(&fx.ctx(200.0, 200.0), PointerButton::Primary);
        let result = action.on_pointer_up(&fx.ctx(210.0, 8.0), PointerButton::Primary);
        match result {
            ActionResult::Commit {
                command: PlanCommand::AddWall { end, .. },
                ..
            } => assert_eq!(end, Point2::new(203.0, 0.0)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_preview_follows_pointer() {
        let fx = Fixture::new();
        let mut action = DrawWallAction::new();
        action.on_pointer_down(&fx.ctx(0.0, 0.0), PointerButton::Primary);
        action.on_pointer_move(&fx.ctx(139.0, 2.0));

        let preview = action.get_preview(&fx.ctx(139.0, 2.0));
        assert!(preview.contains(&PreviewShape::Segment {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(140.0, 0.0),
            thickness: 10.0,
        }));
    }

    #[test]
    fn test_secondary_button_abandons_drag() {
        let fx = Fixture::new();
        let mut action = DrawWallAction::new();
        action.on_pointer_down(&fx.ctx(0.0, 0.0), PointerButton::Primary);
        assert_eq!(
            action.on_pointer_down(&fx.ctx(0.0, 0.0), PointerButton::Secondary),
            ActionResult::Continue
        );
        assert_eq!(action.phase(), GesturePhase::Idle);
        assert_eq!(
            action.on_pointer_down(&fx.ctx(0.0, 0.0), PointerButton::Secondary),
            ActionResult::Cancel
        );
    }
}
