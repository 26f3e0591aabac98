//! 路径 Action（分区、道路、用地红线）
//!
//! 逐点单击添加顶点：
//! - 分区与红线为闭合路径：单击首个顶点附近或按 Enter（≥3 个顶点）完成
//! - 道路为开放路径：按 Enter 或右键（≥2 个顶点）完成

use crate::action::{
    Action, ActionContext, ActionResult, GesturePhase, Key, PointerButton, PreviewShape,
};
use crate::state::SketchTool;
use zplan_core::math::{approx_eq, Point2};
use zplan_core::model::{InfrastructureKind, Point2D, ZoneType};
use zplan_core::PlanCommand;

/// 路径的目标实体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget {
    Zone(ZoneType),
    Road,
    Property,
}

impl PathTarget {
    fn is_closed(&self) -> bool {
        !matches!(self, PathTarget::Road)
    }

    fn min_points(&self) -> usize {
        if self.is_closed() {
            3
        } else {
            2
        }
    }
}

pub struct DrawPathAction {
    target: PathTarget,
    points: Vec<Point2>,
}

impl DrawPathAction {
    pub fn new(target: PathTarget) -> Self {
        Self {
            target,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// 顶点足够时生成命令并清空路径
    fn finish(&mut self) -> ActionResult {
        if self.points.len() < self.target.min_points() {
            return ActionResult::Continue;
        }
        let path: Vec<Point2D> = self.points.drain(..).map(Point2D::from).collect();
        let command = match self.target {
            PathTarget::Zone(zone_type) => PlanCommand::AddZone {
                name: "Zone".to_string(),
                zone_type,
                path,
            },
            PathTarget::Road => PlanCommand::AddInfrastructure {
                kind: InfrastructureKind::Road,
                path,
                width: None,
            },
            PathTarget::Property => PlanCommand::AddPropertyLine { points: path },
        };
        ActionResult::commit(command)
    }
}

impl Action for DrawPathAction {
    fn tool(&self) -> SketchTool {
        match self.target {
            PathTarget::Zone(_) => SketchTool::Zone,
            PathTarget::Road => SketchTool::Road,
            PathTarget::Property => SketchTool::Property,
        }
    }

    fn reset(&mut self) {
        self.points.clear();
    }

    fn phase(&self) -> GesturePhase {
        if self.points.is_empty() {
            GesturePhase::Idle
        } else {
            GesturePhase::Drawing
        }
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext, button: PointerButton) -> ActionResult {
        match button {
            PointerButton::Primary => {
                let point = ctx.snapped_point();
                if self.target.is_closed() && self.points.len() >= 3 {
                    let first = self.points[0];
                    if (point - first).norm() <= ctx.snap.config().threshold {
                        return self.finish();
                    }
                }
                if self.points.last().is_some_and(|last| approx_eq(*last, point)) {
                    return ActionResult::Continue;
                }
                self.points.push(point);
                ActionResult::Continue
            }
            PointerButton::Secondary if self.points.is_empty() => ActionResult::Cancel,
            PointerButton::Secondary => match self.finish() {
                ActionResult::Continue => {
                    self.points.clear();
                    ActionResult::Continue
                }
                done => done,
            },
        }
    }

    fn on_pointer_move(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    fn on_key(&mut self, _ctx: &ActionContext, key: Key) -> ActionResult {
        match key {
            Key::Enter => self.finish(),
            _ => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        match (self.target.is_closed(), self.points.len()) {
            (_, 0) => "单击指定第一个顶点:",
            (true, n) if n >= 3 => "继续添加顶点，单击首点或按 Enter 闭合:",
            (false, n) if n >= 2 => "继续添加顶点，按 Enter 或右键完成:",
            _ => "单击指定下一个顶点:",
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewShape> {
        let snapped = ctx.snapped();
        let mut shapes = Vec::new();
        if !self.points.is_empty() {
            let mut points = self.points.clone();
            points.push(snapped.point);
            shapes.push(PreviewShape::Polyline {
                points,
                closed: self.target.is_closed(),
            });
        }
        shapes.push(PreviewShape::Marker {
            at: snapped.point,
            snap: snapped.snap_type,
        });
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::Fixture;

    fn click(action: &mut DrawPathAction, fx: &Fixture, x: f64, y: f64) -> ActionResult {
        action.on_pointer_down(&fx.ctx(x, y), PointerButton::Primary)
    }

    #[test]
    fn test_zone_closes_on_first_vertex() {
        let fx = Fixture::new();
        let mut action = DrawPathAction::new(PathTarget::Zone(ZoneType::GreenSpace));

        click(&mut action, &fx, 0.0, 0.0);
        click(&mut action, &fx, 200.0, 0.0);
        click(&mut action, &fx, 200.0, 200.0);
        assert_eq!(action.phase(), GesturePhase::Drawing);

        match click(&mut action, &fx, 3.0, 2.0) {
            ActionResult::Commit {
                command: PlanCommand::AddZone { zone_type, path, .. },
                switch_to: None,
            } => {
                assert_eq!(zone_type, ZoneType::GreenSpace);
                assert_eq!(path.len(), 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(action.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_enter_needs_enough_vertices() {
        let fx = Fixture::new();
        let mut action = DrawPathAction::new(PathTarget::Property);
        click(&mut action, &fx, 0.0, 0.0);
        click(&mut action, &fx, 100.0, 0.0);
        assert_eq!(action.on_key(&fx.ctx(0.0, 0.0), Key::Enter), ActionResult::Continue);
        assert_eq!(action.points().len(), 2);

        click(&mut action, &fx, 100.0, 100.0);
        assert!(matches!(
            action.on_key(&fx.ctx(0.0, 0.0), Key::Enter),
            ActionResult::Commit {
                command: PlanCommand::AddPropertyLine { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_road_finishes_on_secondary_click() {
        let fx = Fixture::new();
        let mut action = DrawPathAction::new(PathTarget::Road);
        click(&mut action, &fx, 0.0, 0.0);
        click(&mut action, &fx, 400.0, 0.0);

        match action.on_pointer_down(&fx.ctx(0.0, 0.0), PointerButton::Secondary) {
            ActionResult::Commit {
                command: PlanCommand::AddInfrastructure { kind, path, width },
                ..
            } => {
                assert_eq!(kind, InfrastructureKind::Road);
                assert_eq!(path.len(), 2);
                assert_eq!(width, None);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_click_is_ignored() {
        let fx = Fixture::new();
        let mut action = DrawPathAction::new(PathTarget::Road);
        click(&mut action, &fx, 0.0, 0.0);
        click(&mut action, &fx, 1.0, 1.0);
        assert_eq!(action.points().len(), 1);
    }
}
