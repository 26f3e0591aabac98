//! 二维显示列表
//!
//! 平面视图完全由 {活动楼层, 下层底图, 编辑模式, 本地选择, 远端选择与光标, 预览}
//! 确定性地重新生成；宿主只需按顺序绘制 `DisplayList`。

use crate::action::PreviewShape;
use crate::hit::{opening_segment, room_outline};
use std::collections::HashSet;
use zplan_core::document::PlanDocument;
use zplan_core::geometry::area_to_square_meters;
use zplan_core::math::Point2;
use zplan_core::model::{Level, OpeningKind, Selection};
use zplan_core::presence::Presence;
use zplan_core::snap::EditorMode;

// ========== 颜色 ==========

pub const WALL_COLOR: u32 = 0xcbd5e1;
pub const UNDERLAY_COLOR: u32 = 0x334155;
pub const SELECTED_COLOR: u32 = 0xf59e0b;
pub const OPENING_COLOR: u32 = 0x38bdf8;
pub const ROOM_COLOR: u32 = 0x475569;
pub const MODEL_COLOR: u32 = 0x94a3b8;
pub const DIMENSION_COLOR: u32 = 0xe2e8f0;
pub const COMMENT_COLOR: u32 = 0xfacc15;
pub const ROAD_COLOR: u32 = 0x52525b;
pub const PROPERTY_COLOR: u32 = 0xef4444;
pub const GRID_COLOR: u32 = 0x1e293b;
pub const PREVIEW_COLOR: u32 = 0x60a5fa;

/// 远端锁定实体的透明度
pub const LOCKED_OPACITY: f32 = 0.6;
/// 单轴网格线数量上限，超出时不绘制网格
pub const MAX_GRID_LINES: usize = 1000;

/// 绘制样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: u32,
    pub opacity: f32,
    pub dashed: bool,
    /// 可否被点选
    pub interactive: bool,
}

impl Style {
    pub const fn normal(stroke: u32) -> Self {
        Self {
            stroke,
            opacity: 1.0,
            dashed: false,
            interactive: true,
        }
    }

    pub const fn selected() -> Self {
        Self::normal(SELECTED_COLOR)
    }

    /// 被远端用户选中：不可交互、半透明、虚线
    pub const fn locked(stroke: u32) -> Self {
        Self {
            stroke,
            opacity: LOCKED_OPACITY,
            dashed: true,
            interactive: false,
        }
    }

    pub const fn underlay() -> Self {
        Self {
            stroke: UNDERLAY_COLOR,
            opacity: 1.0,
            dashed: false,
            interactive: false,
        }
    }

    pub const fn frozen(stroke: u32) -> Self {
        Self {
            stroke,
            opacity: 1.0,
            dashed: false,
            interactive: false,
        }
    }
}

/// 可见区域（平面坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min: Point2,
    pub max: Point2,
}

impl Viewport {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Point2::new(0.0, 0.0), Point2::new(1000.0, 800.0))
    }
}

/// 显示列表中的绘制项
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    GridLine {
        from: Point2,
        to: Point2,
    },
    GridDot {
        at: Point2,
    },
    Wall {
        id: String,
        from: Point2,
        to: Point2,
        thickness: f64,
        style: Style,
    },
    Opening {
        id: String,
        kind: OpeningKind,
        from: Point2,
        to: Point2,
        thickness: f64,
        style: Style,
    },
    Room {
        id: String,
        outline: Vec<Point2>,
        label: String,
        area_m2: f64,
        style: Style,
    },
    Model {
        id: String,
        corners: [Point2; 4],
        style: Style,
    },
    Dimension {
        id: String,
        from: Point2,
        to: Point2,
        label: String,
        style: Style,
    },
    Comment {
        id: String,
        at: Point2,
        resolved: bool,
        style: Style,
    },
    Zone {
        id: String,
        outline: Vec<Point2>,
        fill: u32,
        style: Style,
    },
    Road {
        id: String,
        path: Vec<Point2>,
        width: Option<f64>,
        style: Style,
    },
    PropertyLine {
        id: String,
        points: Vec<Point2>,
        style: Style,
    },
    Preview {
        shape: PreviewShape,
        color: u32,
    },
    RemoteCursor {
        user_id: String,
        user_name: String,
        color: &'static str,
        at: Point2,
    },
}

impl DrawItem {
    pub fn id(&self) -> Option<&str> {
        match self {
            DrawItem::Wall { id, .. }
            | DrawItem::Opening { id, .. }
            | DrawItem::Room { id, .. }
            | DrawItem::Model { id, .. }
            | DrawItem::Dimension { id, .. }
            | DrawItem::Comment { id, .. }
            | DrawItem::Zone { id, .. }
            | DrawItem::Road { id, .. }
            | DrawItem::PropertyLine { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            DrawItem::Wall { style, .. }
            | DrawItem::Opening { style, .. }
            | DrawItem::Room { style, .. }
            | DrawItem::Model { style, .. }
            | DrawItem::Dimension { style, .. }
            | DrawItem::Comment { style, .. }
            | DrawItem::Zone { style, .. }
            | DrawItem::Road { style, .. }
            | DrawItem::PropertyLine { style, .. } => Some(style),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawItem> {
        self.items.iter()
    }

    /// 活动楼层上 id 对应的实体项（底图除外）
    pub fn find(&self, id: &str) -> Option<&DrawItem> {
        self.items
            .iter()
            .find(|item| item.id() == Some(id) && item.style() != Some(&Style::underlay()))
    }

    pub fn style_of(&self, id: &str) -> Option<&Style> {
        self.find(id).and_then(DrawItem::style)
    }

    pub fn remote_cursors(&self) -> impl Iterator<Item = &DrawItem> {
        self.items
            .iter()
            .filter(|item| matches!(item, DrawItem::RemoteCursor { .. }))
    }
}

/// 显示列表的全部输入
pub struct RenderInput<'a> {
    pub document: &'a PlanDocument,
    pub mode: EditorMode,
    pub selection: Option<&'a Selection>,
    pub local_user_id: &'a str,
    pub presence: &'a Presence,
    pub viewport: Viewport,
    pub preview: &'a [PreviewShape],
    pub grid_size: f64,
}

struct Styler<'a> {
    level: &'a Level,
    level_index: usize,
    selection: Option<&'a Selection>,
    locked: HashSet<String>,
}

impl Styler<'_> {
    /// 远端锁定优先于本地选择
    fn style(&self, base: u32, id: &str, layer_id: Option<&str>) -> Style {
        if self.locked.contains(id) {
            return Style::locked(base);
        }
        let selected = self.selection.is_some_and(|s| {
            s.id == id && (!s.kind.is_level_scoped() || s.level_index == self.level_index)
        });
        if selected {
            return Style::selected();
        }
        match layer_id {
            Some(layer) if !self.level.is_layer_interactive(layer) => Style::frozen(base),
            _ => Style::normal(base),
        }
    }

    fn visible(&self, layer_id: &str) -> bool {
        self.level.is_layer_visible(layer_id)
    }
}

fn grid_items(mode: EditorMode, viewport: Viewport, grid_size: f64, out: &mut Vec<DrawItem>) {
    if grid_size <= 0.0 {
        return;
    }
    let axis = |min: f64, max: f64| -> Vec<f64> {
        let first = (min / grid_size).ceil() as i64;
        let last = (max / grid_size).floor() as i64;
        if last < first || (last - first) as usize >= MAX_GRID_LINES {
            return Vec::new();
        }
        (first..=last).map(|i| i as f64 * grid_size).collect()
    };
    let xs = axis(viewport.min.x, viewport.max.x);
    let ys = axis(viewport.min.y, viewport.max.y);
    if xs.is_empty() || ys.is_empty() {
        tracing::debug!("grid skipped for viewport {:?}", viewport);
        return;
    }

    match mode {
        EditorMode::Precision => {
            for &x in &xs {
                out.push(DrawItem::GridLine {
                    from: Point2::new(x, viewport.min.y),
                    to: Point2::new(x, viewport.max.y),
                });
            }
            for &y in &ys {
                out.push(DrawItem::GridLine {
                    from: Point2::new(viewport.min.x, y),
                    to: Point2::new(viewport.max.x, y),
                });
            }
        }
        EditorMode::Concept => {
            for &y in &ys {
                for &x in &xs {
                    out.push(DrawItem::GridDot {
                        at: Point2::new(x, y),
                    });
                }
            }
        }
    }
}

/// 生成平面显示列表
///
/// 绘制顺序：网格、下层底图、场地（分区/红线/道路）、房间、墙、门窗、模型、
/// 尺寸线、批注、预览、远端光标。
pub fn render_plan(input: &RenderInput) -> DisplayList {
    let mut items = Vec::new();
    grid_items(input.mode, input.viewport, input.grid_size, &mut items);

    let document = input.document;
    let Some(level) = document.active_level() else {
        return DisplayList { items };
    };

    if let Some(below) = document.underlay_level() {
        for wall in below.walls.iter().filter(|w| below.is_layer_visible(&w.layer_id)) {
            items.push(DrawItem::Wall {
                id: wall.id.clone(),
                from: wall.start(),
                to: wall.end(),
                thickness: wall.thickness,
                style: Style::underlay(),
            });
        }
    }

    let styler = Styler {
        level,
        level_index: document.active_level_index,
        selection: input.selection,
        locked: input.presence.locked_ids(input.local_user_id),
    };

    // 场地
    for zone in document.zones.iter().filter(|z| styler.visible(&z.layer_id)) {
        items.push(DrawItem::Zone {
            id: zone.id.clone(),
            outline: zone.path.iter().copied().map(Point2::from).collect(),
            fill: zone.zone_type.color(),
            style: styler.style(zone.zone_type.color(), &zone.id, Some(&zone.layer_id)),
        });
    }
    for line in &document.property_lines {
        items.push(DrawItem::PropertyLine {
            id: line.id.clone(),
            points: line.points.iter().copied().map(Point2::from).collect(),
            style: styler.style(PROPERTY_COLOR, &line.id, None),
        });
    }
    for road in document
        .infrastructure
        .iter()
        .filter(|r| styler.visible(&r.layer_id))
    {
        items.push(DrawItem::Road {
            id: road.id.clone(),
            path: road.path.iter().copied().map(Point2::from).collect(),
            width: road.width,
            style: styler.style(ROAD_COLOR, &road.id, Some(&road.layer_id)),
        });
    }

    // 楼层实体
    for room in level.rooms.iter().filter(|r| styler.visible(&r.layer_id)) {
        items.push(DrawItem::Room {
            id: room.id.clone(),
            outline: room_outline(level, room),
            label: room.name.clone(),
            area_m2: area_to_square_meters(room.calculated_area.unwrap_or(0.0)),
            style: styler.style(ROOM_COLOR, &room.id, Some(&room.layer_id)),
        });
    }
    for wall in level.walls.iter().filter(|w| styler.visible(&w.layer_id)) {
        items.push(DrawItem::Wall {
            id: wall.id.clone(),
            from: wall.start(),
            to: wall.end(),
            thickness: wall.thickness,
            style: styler.style(WALL_COLOR, &wall.id, Some(&wall.layer_id)),
        });
    }
    for placement in level
        .placements
        .iter()
        .filter(|p| styler.visible(&p.layer_id))
    {
        let Some(wall) = level.wall(&placement.wall_id) else {
            continue;
        };
        if !styler.visible(&wall.layer_id) {
            continue;
        }
        let segment = opening_segment(wall, placement);
        items.push(DrawItem::Opening {
            id: placement.id.clone(),
            kind: placement.kind,
            from: segment.start,
            to: segment.end,
            thickness: wall.thickness,
            style: styler.style(OPENING_COLOR, &placement.id, Some(&placement.layer_id)),
        });
    }
    for model in level
        .placed_models
        .iter()
        .filter(|m| styler.visible(&m.layer_id))
    {
        items.push(DrawItem::Model {
            id: model.id.clone(),
            corners: model.footprint(),
            style: styler.style(MODEL_COLOR, &model.id, Some(&model.layer_id)),
        });
    }
    for dim in level
        .dimension_lines
        .iter()
        .filter(|d| styler.visible(&d.layer_id))
    {
        items.push(DrawItem::Dimension {
            id: dim.id.clone(),
            from: dim.p1.into(),
            to: dim.p2.into(),
            label: format!("{:.0}", dim.measured_length()),
            style: styler.style(DIMENSION_COLOR, &dim.id, Some(&dim.layer_id)),
        });
    }
    for comment in level.comments.iter().filter(|c| styler.visible(&c.layer_id)) {
        items.push(DrawItem::Comment {
            id: comment.id.clone(),
            at: comment.position(),
            resolved: comment.resolved,
            style: styler.style(COMMENT_COLOR, &comment.id, Some(&comment.layer_id)),
        });
    }

    for shape in input.preview {
        items.push(DrawItem::Preview {
            shape: shape.clone(),
            color: PREVIEW_COLOR,
        });
    }

    for (user_id, cursor) in input.presence.cursors() {
        if user_id == input.local_user_id {
            continue;
        }
        items.push(DrawItem::RemoteCursor {
            user_id: user_id.to_string(),
            user_name: cursor.user_name.clone(),
            color: cursor.color,
            at: cursor.position,
        });
    }

    DisplayList { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use zplan_core::model::{EntityKind, Layer, Level, Wall};

    fn wall(id: &str, a: (f64, f64), b: (f64, f64)) -> Wall {
        Wall::new(id, Point2::new(a.0, a.1), Point2::new(b.0, b.1), 10.0, 240.0, "layer_default")
    }

    fn two_story() -> PlanDocument {
        let mut doc = PlanDocument::new();
        doc.levels[0].walls.push(wall("g1", (0.0, 0.0), (400.0, 0.0)));
        let mut upper = Level::new("level_1", "First Floor", 300.0);
        upper.walls.push(wall("u1", (0.0, 0.0), (0.0, 300.0)));
        doc.levels.push(upper);
        doc.active_level_index = 1;
        doc
    }

    fn input<'a>(
        doc: &'a PlanDocument,
        presence: &'a Presence,
        selection: Option<&'a Selection>,
    ) -> RenderInput<'a> {
        RenderInput {
            document: doc,
            mode: EditorMode::Precision,
            selection,
            local_user_id: "me",
            presence,
            viewport: Viewport::new(Point2::new(0.0, 0.0), Point2::new(100.0, 100.0)),
            preview: &[],
            grid_size: 20.0,
        }
    }

    #[test]
    fn test_underlay_is_dimmed_and_inert() {
        let doc = two_story();
        let presence = Presence::default();
        let list = render_plan(&input(&doc, &presence, None));

        let underlay = list
            .iter()
            .find(|i| i.id() == Some("g1"))
            .and_then(DrawItem::style)
            .copied()
            .unwrap();
        assert_eq!(underlay, Style::underlay());
        assert_eq!(list.style_of("u1"), Some(&Style::normal(WALL_COLOR)));
    }

    #[test]
    fn test_remote_selection_wins_over_local() {
        let doc = two_story();
        let mut presence = Presence::default();
        let remote = Selection::new("u1", EntityKind::Wall, 1);
        presence.update_selection("them", Some(&remote), Instant::now());

        let local = Selection::new("u1", EntityKind::Wall, 1);
        let list = render_plan(&input(&doc, &presence, Some(&local)));
        let style = list.style_of("u1").unwrap();
        assert!(!style.interactive);
        assert!(style.dashed);
        assert_eq!(style.opacity, LOCKED_OPACITY);
    }

    #[test]
    fn test_local_selection_highlight() {
        let doc = two_story();
        let presence = Presence::default();
        let local = Selection::new("u1", EntityKind::Wall, 1);
        let list = render_plan(&input(&doc, &presence, Some(&local)));
        assert_eq!(list.style_of("u1"), Some(&Style::selected()));
    }

    #[test]
    fn test_grid_depends_on_mode() {
        let doc = PlanDocument::new();
        let presence = Presence::default();
        let mut precise = input(&doc, &presence, None);
        let lines = render_plan(&precise)
            .iter()
            .filter(|i| matches!(i, DrawItem::GridLine { .. }))
            .count();
        assert_eq!(lines, 12);

        precise.mode = EditorMode::Concept;
        let list = render_plan(&precise);
        assert_eq!(
            list.iter().filter(|i| matches!(i, DrawItem::GridDot { .. })).count(),
            36
        );
        assert!(!list.iter().any(|i| matches!(i, DrawItem::GridLine { .. })));
    }

    #[test]
    fn test_hidden_layer_is_not_drawn() {
        let mut doc = PlanDocument::new();
        let mut hidden = Layer::new("layer_hidden", "Hidden");
        hidden.is_visible = false;
        doc.levels[0].layers.push(hidden);
        let mut w = wall("w1", (0.0, 0.0), (100.0, 0.0));
        w.layer_id = "layer_hidden".into();
        doc.levels[0].walls.push(w);

        let presence = Presence::default();
        let list = render_plan(&input(&doc, &presence, None));
        assert!(list.find("w1").is_none());
    }

    #[test]
    fn test_render_is_deterministic_and_lists_remote_cursors() {
        let doc = two_story();
        let mut presence = Presence::default();
        let now = Instant::now();
        presence.update_cursor("zed", "Zed", Point2::new(5.0, 5.0), now);
        presence.update_cursor("amy", "Amy", Point2::new(9.0, 1.0), now);
        presence.update_cursor("me", "Me", Point2::new(0.0, 0.0), now);

        let a = render_plan(&input(&doc, &presence, None));
        let b = render_plan(&input(&doc, &presence, None));
        assert_eq!(a, b);

        let names: Vec<_> = a
            .remote_cursors()
            .map(|i| match i {
                DrawItem::RemoteCursor { user_name, .. } => user_name.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, ["Amy", "Zed"]);
    }
}
