//! 具体的 Action 实现
//!
//! 每个草图工具对应一个 Action 实现

mod drag;
mod draw_dimension;
mod draw_path;
mod draw_wall;
mod place_comment;
mod place_opening;
mod select;

pub use draw_dimension::DrawDimensionAction;
pub use draw_path::{DrawPathAction, PathTarget};
pub use draw_wall::DrawWallAction;
pub use place_comment::PlaceCommentAction;
pub use place_opening::{position_ratio, PlaceOpeningAction};
pub use select::SelectAction;

use crate::action::Action;
use crate::state::SketchTool;
use zplan_core::model::ZoneType;

/// 创建指定工具的 Action
pub fn create_action(tool: SketchTool, zone_type: ZoneType) -> Box<dyn Action> {
    match tool {
        SketchTool::Select => Box::new(SelectAction::new()),
        SketchTool::Wall => Box::new(DrawWallAction::new()),
        SketchTool::Door => Box::new(PlaceOpeningAction::door()),
        SketchTool::Window => Box::new(PlaceOpeningAction::window()),
        SketchTool::Dimension => Box::new(DrawDimensionAction::new()),
        SketchTool::Comment => Box::new(PlaceCommentAction::new()),
        SketchTool::Zone => Box::new(DrawPathAction::new(PathTarget::Zone(zone_type))),
        SketchTool::Road => Box::new(DrawPathAction::new(PathTarget::Road)),
        SketchTool::Property => Box::new(DrawPathAction::new(PathTarget::Property)),
    }
}
