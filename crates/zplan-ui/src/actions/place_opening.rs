//! 门窗定位 Action
//!
//! 单击最近的墙体，按投影点计算沿墙比例并生成门或窗，随后回到选择工具。

use crate::action::{Action, ActionContext, ActionResult, PointerButton, PreviewShape};
use crate::state::SketchTool;
use zplan_core::geometry::{closest_point_on_segment, distance};
use zplan_core::math::Point2;
use zplan_core::model::{OpeningKind, Wall};
use zplan_core::PlanCommand;

pub struct PlaceOpeningAction {
    kind: OpeningKind,
    /// 悬停时的候选宿主墙
    hover: Option<String>,
}

impl PlaceOpeningAction {
    pub fn new(kind: OpeningKind) -> Self {
        Self { kind, hover: None }
    }

    pub fn door() -> Self {
        Self::new(OpeningKind::Door)
    }

    pub fn window() -> Self {
        Self::new(OpeningKind::Window)
    }

    /// 可见且未锁定图层上、阈值内最近的墙
    fn host_wall<'a>(ctx: &ActionContext<'a>) -> Option<&'a Wall> {
        let level = ctx.level;
        let candidates = level
            .walls
            .iter()
            .filter(|w| level.is_layer_interactive(&w.layer_id));
        ctx.snap
            .find_host_wall(ctx.pointer, candidates)
            .map(|(wall, _)| wall)
    }
}

/// 指针在墙上投影点的沿墙比例
pub fn position_ratio(wall: &Wall, pointer: Point2) -> f64 {
    let length = wall.length();
    if length <= 0.0 {
        return 0.0;
    }
    let closest = closest_point_on_segment(pointer, wall.start(), wall.end());
    (distance(closest, wall.start()) / length).clamp(0.0, 1.0)
}

impl Action for PlaceOpeningAction {
    fn tool(&self) -> SketchTool {
        match self.kind {
            OpeningKind::Door => SketchTool::Door,
            OpeningKind::Window => SketchTool::Window,
        }
    }

    fn reset(&mut self) {
        self.hover = None;
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        if button == PointerButton::Secondary {
            return ActionResult::Cancel;
        }

        let Some(wall) = Self::host_wall(ctx) else {
            tracing::debug!("no host wall near ({:.1}, {:.1})", ctx.pointer.x, ctx.pointer.y);
            return ActionResult::Continue;
        };

        self.hover = None;
        ActionResult::Commit {
            command: PlanCommand::AddPlacement {
                wall_id: wall.id.clone(),
                kind: self.kind,
                position_ratio: position_ratio(wall, ctx.pointer),
                width: None,
                height: None,
            },
            switch_to: Some(SketchTool::Select),
        }
    }

    fn on_pointer_move(&mut self, ctx: &ActionContext) -> ActionResult {
        self.hover = Self::host_wall(ctx).map(|w| w.id.clone());
        ActionResult::Continue
    }

    fn get_prompt(&self) -> &str {
        match self.kind {
            OpeningKind::Door => "单击墙体放置门:",
            OpeningKind::Window => "单击墙体放置窗:",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext) -> Vec<PreviewShape> {
        self.hover
            .iter()
            .map(|id| PreviewShape::HostWall {
                wall_id: id.clone(),
            })
            .collect()
    }
}
