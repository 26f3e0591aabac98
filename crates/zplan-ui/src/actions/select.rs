//! 选择 Action

use crate::action::{Action, ActionContext, ActionResult, PointerButton, PreviewShape};
use crate::hit;
use crate::state::SketchTool;

/// 点选：命中实体则选中，空白处清除选择
pub struct SelectAction;

impl SelectAction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SelectAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for SelectAction {
    fn tool(&self) -> SketchTool {
        SketchTool::Select
    }

    fn reset(&mut self) {}

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        match button {
            PointerButton::Primary => ActionResult::Select(hit::pick(
                ctx.level,
                ctx.level_index,
                ctx.pointer,
                ctx.locked_ids,
            )),
            PointerButton::Secondary => ActionResult::Continue,
        }
    }

    fn on_pointer_move(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    fn get_prompt(&self) -> &str {
        "选择对象:"
    }

    fn get_preview(&self, _ctx: &ActionContext) -> Vec<PreviewShape> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::Fixture;
    use zplan_core::model::{EntityKind, Selection};

    #[test]
    fn test_click_selects_and_empty_clears() {
        let fx = Fixture::new().with_wall("w1", (0.0, 0.0), (200.0, 0.0));
        let mut action = SelectAction::new();

        assert_eq!(
            action.on_pointer_down(&fx.ctx(100.0, 2.0), PointerButton::Primary),
            ActionResult::Select(Some(Selection::new("w1", EntityKind::Wall, 0)))
        );
        assert_eq!(
            action.on_pointer_down(&fx.ctx(100.0, 200.0), PointerButton::Primary),
            ActionResult::Select(None)
        );
    }

    #[test]
    fn test_remote_locked_wall_cannot_be_selected() {
        let mut fx = Fixture::new().with_wall("w1", (0.0, 0.0), (200.0, 0.0));
        fx.locked.insert("w1".into());
        let mut action = SelectAction::new();

        assert_eq!(
            action.on_pointer_down(&fx.ctx(100.0, 2.0), PointerButton::Primary),
            ActionResult::Select(None)
        );
    }
}
