//! 几何内核
//!
//! 纯函数，无状态：
//! - 距离、向量、长度
//! - 点到线段的距离与最近点（墙体拾取、门窗定位）
//! - 多边形顶点排序与面积（Shoelace 公式，房间面积）

use crate::math::{Point2, Vector2, EPSILON};

/// 两点距离
#[inline]
pub fn distance(p: Point2, q: Point2) -> f64 {
    (q - p).norm()
}

/// 线段参数：`p` 在线段 `v→w` 上的钳制投影参数，范围 [0, 1]
///
/// 退化线段（两端点重合）返回 0。
pub fn segment_param(p: Point2, v: Point2, w: Point2) -> f64 {
    let d = w - v;
    let len_sq = d.norm_squared();
    if len_sq <= EPSILON * EPSILON {
        return 0.0;
    }
    ((p - v).dot(&d) / len_sq).clamp(0.0, 1.0)
}

/// 线段 `v→w` 上距 `p` 最近的点
pub fn closest_point_on_segment(p: Point2, v: Point2, w: Point2) -> Point2 {
    let t = segment_param(p, v, w);
    v + (w - v) * t
}

/// 点到线段的距离（钳制投影）
pub fn point_to_segment_distance(p: Point2, v: Point2, w: Point2) -> f64 {
    distance(p, closest_point_on_segment(p, v, w))
}

/// 线段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 方向向量（未归一化）
    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// 与 x 轴的夹角（弧度）
    pub fn angle(&self) -> f64 {
        let v = self.vector();
        v.y.atan2(v.x)
    }

    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.start, &self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() <= EPSILON
    }

    pub fn distance_to_point(&self, p: Point2) -> f64 {
        point_to_segment_distance(p, self.start, self.end)
    }

    pub fn closest_point(&self, p: Point2) -> Point2 {
        closest_point_on_segment(p, self.start, self.end)
    }

    /// 沿线段距起点 `offset` 处的点
    pub fn point_at(&self, offset: f64) -> Point2 {
        let len = self.length();
        if len <= EPSILON {
            return self.start;
        }
        self.start + self.vector() * (offset / len)
    }
}

/// 按首次出现顺序去重后的顶点集合
///
/// 坐标按位比较（`-0.0` 与 `0.0` 视为相同），与房间面积的“唯一顶点”语义一致。
pub fn unique_vertices<'a, I>(segments: I) -> Vec<Point2>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for seg in segments {
        for p in [seg.start, seg.end] {
            let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            if seen.insert(key) {
                out.push(p);
            }
        }
    }
    out
}

/// 顶点质心（算术平均）
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f64))
}

/// 围绕质心按极角排序顶点
///
/// 对于关于质心星形的多边形，结果是逆时针的简单多边形；
/// 输入顺序与方向不影响结果（仅极角完全相同的顶点保持原相对顺序）。
pub fn order_polygon_vertices(points: &[Point2]) -> Vec<Point2> {
    let Some(c) = centroid(points) else {
        return Vec::new();
    };
    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        let ta = (a.y - c.y).atan2(a.x - c.x);
        let tb = (b.y - c.y).atan2(b.x - c.x);
        ta.total_cmp(&tb)
    });
    ordered
}

/// 有符号面积（Shoelace），逆时针为正
pub fn signed_polygon_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

/// 多边形面积（绝对值），少于 3 个顶点为 0
pub fn polygon_area(points: &[Point2]) -> f64 {
    signed_polygon_area(points).abs()
}

/// 由房间边界墙段计算面积
///
/// 少于 3 段墙、或少于 3 个唯一顶点时返回 0。
pub fn room_area(segments: &[Segment]) -> f64 {
    if segments.len() < 3 {
        return 0.0;
    }
    let unique = unique_vertices(segments);
    if unique.len() < 3 {
        return 0.0;
    }
    polygon_area(&order_polygon_vertices(&unique))
}

/// 射线法判断点是否在多边形内
pub fn point_in_polygon(p: Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// 平面单位（厘米）的面积换算为平方米
#[inline]
pub fn area_to_square_meters(area: f64) -> f64 {
    area / 10_000.0
}
