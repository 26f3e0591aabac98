//! 按下-拖动-释放的线段手势（墙、尺寸线共用）

use crate::action::{ActionContext, PreviewShape};
use zplan_core::math::{approx_eq, Point2};

/// 拖动状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 等待按下
    SetStartpoint,
    /// 拖动中
    Dragging { start: Point2, current: Point2 },
}

#[derive(Debug, Clone)]
pub(crate) struct DragGesture {
    status: Status,
}

impl DragGesture {
    pub fn new() -> Self {
        Self {
            status: Status::SetStartpoint,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.status, Status::Dragging { .. })
    }

    pub fn reset(&mut self) {
        self.status = Status::SetStartpoint;
    }

    /// 起点取捕捉后的位置
    pub fn begin(&mut self, ctx: &ActionContext) {
        let start = ctx.snapped_point();
        self.status = Status::Dragging {
            start,
            current: start,
        };
    }

    /// 每次移动都重新捕捉实时终点
    pub fn update(&mut self, ctx: &ActionContext) {
        if let Status::Dragging { start, .. } = self.status {
            self.status = Status::Dragging {
                start,
                current: ctx.snapped_point(),
            };
        }
    }

    /// 结束拖动；起点与终点重合时返回 None
    pub fn finish(&mut self, ctx: &ActionContext) -> Option<(Point2, Point2)> {
        let Status::Dragging { start, .. } = self.status else {
            return None;
        };
        self.reset();
        let end = ctx.snapped_point();
        if approx_eq(start, end) {
            tracing::debug!("drag discarded: start equals end");
            return None;
        }
        Some((start, end))
    }

    pub fn preview(&self, ctx: &ActionContext, thickness: f64) -> Vec<PreviewShape> {
        let snapped = ctx.snapped();
        let mut shapes = Vec::new();
        if let Status::Dragging { start, current } = self.status {
            shapes.push(PreviewShape::Segment {
                from: start,
                to: current,
                thickness,
            });
        }
        shapes.push(PreviewShape::Marker {
            at: snapped.point,
            snap: snapped.snap_type,
        });
        shapes
    }
}
