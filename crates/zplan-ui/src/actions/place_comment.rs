//! 批注 Action

use crate::action::{Action, ActionContext, ActionResult, PointerButton, PreviewShape};
use crate::state::SketchTool;
use zplan_core::PlanCommand;

/// 单击放置一条空批注，作者为本地用户；随后回到选择工具
pub struct PlaceCommentAction;

impl PlaceCommentAction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceCommentAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for PlaceCommentAction {
    fn tool(&self) -> SketchTool {
        SketchTool::Comment
    }

    fn reset(&mut self) {}

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        match button {
            PointerButton::Primary => ActionResult::Commit {
                command: PlanCommand::AddComment {
                    position: ctx.pointer,
                    text: String::new(),
                    author: ctx.user.clone(),
                },
                switch_to: Some(SketchTool::Select),
            },
            PointerButton::Secondary => ActionResult::Cancel,
        }
    }

    fn on_pointer_move(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    fn get_prompt(&self) -> &str {
        "单击放置批注:"
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewShape> {
        vec![PreviewShape::Marker {
            at: ctx.pointer,
            snap: None,
        }]
    }
}
