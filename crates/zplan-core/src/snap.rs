//! 捕捉系统
//!
//! 绘制墙体、尺寸线与路径时，对指针位置依次执行：
//! 1. 网格捕捉（仅精确模式）：取最近的网格交点，距离不超过阈值才采用
//! 2. 端点捕捉（两种模式）：指针接近任一墙端点时，精确吸附到该端点，覆盖网格结果
//!
//! 编辑模式只改变捕捉策略，不改变工具集。

use crate::geometry::point_to_segment_distance;
use crate::math::Point2;
use crate::model::Wall;
use serde::{Deserialize, Serialize};

/// 编辑模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// 概念模式：点状网格，仅端点捕捉
    #[default]
    Concept,
    /// 精确模式：网格线，网格 + 端点捕捉
    Precision,
}

impl EditorMode {
    pub fn name(&self) -> &'static str {
        match self {
            EditorMode::Concept => "概念",
            EditorMode::Precision => "精确",
        }
    }
}

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapType {
    /// 墙端点
    Endpoint,
    /// 网格点
    Grid,
}

impl SnapType {
    pub fn name(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "端点",
            SnapType::Grid => "网格点",
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Grid => "GRI",
        }
    }
}

/// 捕捉结果
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    /// 最终坐标
    pub point: Point2,
    /// 捕捉类型；None 表示保留原始指针位置
    pub snap_type: Option<SnapType>,
    /// 端点捕捉时关联的墙
    pub wall_id: Option<String>,
}

impl SnapPoint {
    fn raw(point: Point2) -> Self {
        Self {
            point,
            snap_type: None,
            wall_id: None,
        }
    }
}

/// 捕捉配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 捕捉阈值（平面单位）
    pub threshold: f64,
    /// 网格间距
    pub grid_size: f64,
    /// 精确模式下端点捕捉阈值的放大系数
    pub precision_endpoint_factor: f64,
    /// 总开关
    pub enabled: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            threshold: 15.0,
            grid_size: 20.0,
            precision_endpoint_factor: 1.5,
            enabled: true,
        }
    }
}

/// 捕捉引擎
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    /// 端点捕捉阈值
    pub fn endpoint_threshold(&self, mode: EditorMode) -> f64 {
        match mode {
            EditorMode::Precision => self.config.threshold * self.config.precision_endpoint_factor,
            EditorMode::Concept => self.config.threshold,
        }
    }

    /// 最近的网格交点
    pub fn grid_point(&self, pointer: Point2) -> Point2 {
        let g = self.config.grid_size;
        if g <= 0.0 {
            return pointer;
        }
        Point2::new((pointer.x / g).round() * g, (pointer.y / g).round() * g)
    }

    /// 对指针位置执行网格 + 端点捕捉
    ///
    /// 端点捕捉以原始指针位置测距，取阈值内最近的端点。
    pub fn snap(&self, pointer: Point2, mode: EditorMode, walls: &[Wall]) -> SnapPoint {
        if !self.config.enabled {
            return SnapPoint::raw(pointer);
        }

        let mut result = SnapPoint::raw(pointer);

        if mode == EditorMode::Precision {
            let grid = self.grid_point(pointer);
            if (grid - pointer).norm() <= self.config.threshold {
                result.point = grid;
                result.snap_type = Some(SnapType::Grid);
            }
        }

        let threshold = self.endpoint_threshold(mode);
        let nearest = walls
            .iter()
            .flat_map(|w| w.endpoints().map(|p| (p, w)))
            .map(|(p, w)| ((p - pointer).norm(), p, w))
            .filter(|(d, _, _)| *d <= threshold)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((_, point, wall)) = nearest {
            result.point = point;
            result.snap_type = Some(SnapType::Endpoint);
            result.wall_id = Some(wall.id.clone());
        }

        result
    }

    /// 寻找距指针最近、且在阈值内的墙（门窗定位）
    pub fn find_host_wall<'a, I>(&self, pointer: Point2, walls: I) -> Option<(&'a Wall, f64)>
    where
        I: IntoIterator<Item = &'a Wall>,
    {
        walls
            .into_iter()
            .map(|w| (w, point_to_segment_distance(pointer, w.start(), w.end())))
            .filter(|(_, d)| *d <= self.config.threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(id: &str, a: (f64, f64), b: (f64, f64)) -> Wall {
        Wall::new(id, Point2::new(a.0, a.1), Point2::new(b.0, b.1), 10.0, 240.0, "layer_default")
    }

    #[test]
    fn test_precision_grid_snap() {
        let engine = SnapEngine::default();
        let snapped = engine.snap(Point2::new(98.0, 3.0), EditorMode::Precision, &[]);
        assert_eq!(snapped.point, Point2::new(100.0, 0.0));
        assert_eq!(snapped.snap_type, Some(SnapType::Grid));
    }

    #[test]
    fn test_concept_mode_keeps_raw_pointer() {
        let engine = SnapEngine::default();
        let snapped = engine.snap(Point2::new(98.0, 3.0), EditorMode::Concept, &[]);
        assert_eq!(snapped.point, Point2::new(98.0, 3.0));
        assert_eq!(snapped.snap_type, None);
    }

    #[test]
    fn test_grid_rejected_beyond_threshold() {
        let config = SnapConfig {
            threshold: 5.0,
            grid_size: 40.0,
            ..SnapConfig::default()
        };
        let engine = SnapEngine::new(config);
        // 最近网格点 (40, 40)，距离约 14.1 > 5
        let snapped = engine.snap(Point2::new(30.0, 30.0), EditorMode::Precision, &[]);
        assert_eq!(snapped.point, Point2::new(30.0, 30.0));
    }

    #[test]
    fn test_endpoint_overrides_grid() {
        let engine = SnapEngine::default();
        let walls = [wall("w1", (0.0, 0.0), (103.0, 7.0))];
        let snapped = engine.snap(Point2::new(98.0, 3.0), EditorMode::Precision, &walls);
        assert_eq!(snapped.point, Point2::new(103.0, 7.0));
        assert_eq!(snapped.snap_type, Some(SnapType::Endpoint));
        assert_eq!(snapped.wall_id.as_deref(), Some("w1"));
    }

    #[test]
    fn test_endpoint_threshold_depends_on_mode() {
        let engine = SnapEngine::default();
        let walls = [wall("w1", (0.0, 0.0), (100.0, 0.0))];
        // 距端点 20：精确模式阈值 22.5 内，概念模式阈值 15 外
        let pointer = Point2::new(120.0, 0.0);
        assert_eq!(
            engine.snap(pointer, EditorMode::Precision, &walls).snap_type,
            Some(SnapType::Endpoint)
        );
        assert_eq!(engine.snap(pointer, EditorMode::Concept, &walls).point, pointer);
    }

    #[test]
    fn test_snap_idempotent_on_endpoint() {
        let engine = SnapEngine::default();
        let walls = [
            wall("w1", (13.7, -4.2), (250.3, 80.1)),
            wall("w2", (250.3, 80.1), (251.0, 300.0)),
        ];
        for w in &walls {
            for p in w.endpoints() {
                for mode in [EditorMode::Concept, EditorMode::Precision] {
                    assert_eq!(engine.snap(p, mode, &walls).point, p);
                }
            }
        }
    }

    #[test]
    fn test_find_host_wall() {
        let engine = SnapEngine::default();
        let walls = [
            wall("a", (0.0, 0.0), (200.0, 0.0)),
            wall("b", (0.0, 12.0), (200.0, 12.0)),
        ];
        let (host, d) = engine.find_host_wall(Point2::new(50.0, 8.0), &walls).unwrap();
        assert_eq!(host.id, "b");
        assert!((d - 4.0).abs() < 1e-9);
        assert!(engine.find_host_wall(Point2::new(50.0, 40.0), &walls).is_none());
    }
}
