//! 拾取（点选命中测试）
//!
//! 检测顺序：门窗 → 墙体 → 模型 → 尺寸线 → 批注 → 房间。
//! 隐藏或锁定图层上的实体、以及被远端用户选中（软锁）的实体不可拾取。

use std::collections::HashSet;
use zplan_core::geometry::{
    order_polygon_vertices, point_in_polygon, point_to_segment_distance, unique_vertices, Segment,
};
use zplan_core::math::Point2;
use zplan_core::model::{EntityKind, Level, Placement, Room, Selection, Wall};

/// 线状实体的额外拾取容差
pub const HIT_TOLERANCE: f64 = 4.0;
/// 批注图钉的拾取半径
pub const COMMENT_HIT_RADIUS: f64 = 12.0;

/// 门窗在宿主墙上占据的线段
pub fn opening_segment(wall: &Wall, placement: &Placement) -> Segment {
    let segment = wall.segment();
    let (from, to) = placement.interval(segment.length());
    Segment::new(segment.point_at(from), segment.point_at(to))
}

/// 房间轮廓（引用墙体的唯一顶点按极角排序）
pub fn room_outline(level: &Level, room: &Room) -> Vec<Point2> {
    let segments = level.room_segments(room);
    order_polygon_vertices(&unique_vertices(&segments))
}

/// 实体能否被本地用户拾取
pub fn is_pickable(level: &Level, layer_id: &str, id: &str, locked: &HashSet<String>) -> bool {
    level.is_layer_interactive(layer_id) && !locked.contains(id)
}

fn nearest<'a, T>(
    items: impl Iterator<Item = (&'a T, f64, f64)>,
) -> Option<&'a T>
where
    T: 'a,
{
    items
        .filter(|(_, d, tolerance)| *d <= *tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _, _)| item)
}

/// 在活动楼层上拾取指针下的实体
pub fn pick(
    level: &Level,
    level_index: usize,
    point: Point2,
    locked: &HashSet<String>,
) -> Option<Selection> {
    let pickable = |layer_id: &str, id: &str| is_pickable(level, layer_id, id, locked);

    let placement = nearest(level.placements.iter().filter_map(|p| {
        if !pickable(&p.layer_id, &p.id) {
            return None;
        }
        let wall = level.wall(&p.wall_id)?;
        let d = opening_segment(wall, p).distance_to_point(point);
        Some((p, d, wall.thickness / 2.0 + HIT_TOLERANCE))
    }));
    if let Some(p) = placement {
        return Some(Selection::new(&p.id, EntityKind::Placement, level_index));
    }

    let wall = nearest(
        level
            .walls
            .iter()
            .filter(|w| pickable(&w.layer_id, &w.id))
            .map(|w| {
                let d = point_to_segment_distance(point, w.start(), w.end());
                (w, d, w.thickness / 2.0 + HIT_TOLERANCE)
            }),
    );
    if let Some(w) = wall {
        return Some(Selection::new(&w.id, EntityKind::Wall, level_index));
    }

    let model = level
        .placed_models
        .iter()
        .filter(|m| pickable(&m.layer_id, &m.id))
        .find(|m| point_in_polygon(point, &m.footprint()));
    if let Some(m) = model {
        return Some(Selection::new(&m.id, EntityKind::PlacedModel, level_index));
    }

    let dimension = nearest(
        level
            .dimension_lines
            .iter()
            .filter(|d| pickable(&d.layer_id, &d.id))
            .map(|d| {
                let dist = point_to_segment_distance(point, d.p1.into(), d.p2.into());
                (d, dist, HIT_TOLERANCE)
            }),
    );
    if let Some(d) = dimension {
        return Some(Selection::new(&d.id, EntityKind::DimensionLine, level_index));
    }

    let comment = nearest(
        level
            .comments
            .iter()
            .filter(|c| pickable(&c.layer_id, &c.id))
            .map(|c| (c, (c.position() - point).norm(), COMMENT_HIT_RADIUS)),
    );
    if let Some(c) = comment {
        return Some(Selection::new(&c.id, EntityKind::Comment, level_index));
    }

    level
        .rooms
        .iter()
        .filter(|r| pickable(&r.layer_id, &r.id))
        .find(|r| point_in_polygon(point, &room_outline(level, r)))
        .map(|r| Selection::new(&r.id, EntityKind::Room, level_index))
}
