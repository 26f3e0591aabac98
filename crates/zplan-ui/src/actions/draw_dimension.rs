//! 尺寸线 Action

use super::drag::DragGesture;
use crate::action::{Action, ActionContext, ActionResult, GesturePhase, PointerButton, PreviewShape};
use crate::state::SketchTool;
use zplan_core::PlanCommand;

/// 手动尺寸线：与墙体相同的拖动与捕捉
pub struct DrawDimensionAction {
    drag: DragGesture,
}

impl DrawDimensionAction {
    pub fn new() -> Self {
        Self {
            drag: DragGesture::new(),
        }
    }
}

impl Default for DrawDimensionAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawDimensionAction {
    fn tool(&self) -> SketchTool {
        SketchTool::Dimension
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
            Some((p1, p2)) => ActionResult::commit(PlanCommand::AddDimensionLine { p1, p2 }),
            None => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        if self.drag.is_dragging() {
            "拖动到第二个测量点后释放:"
        } else {
            "按下指定第一个测量点:"
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewShape> {
        self.drag.preview(ctx, 0.0)
    }
}
