//! 家具模型、尺寸标注与批注

use super::Point2D;
use crate::math::Point2;
use serde::{Deserialize, Serialize};

/// 放置的家具/设备模型，视觉参数由素材库按 `model_key` 解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedModel {
    pub id: String,
    pub model_key: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
    pub height3d: f64,
    /// 旋转角（度）
    pub rotation: f64,
    pub layer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl PlacedModel {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// 平面占位矩形的四个角点（按旋转后顺序）
    pub fn footprint(&self) -> [Point2; 4] {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let hw = self.width / 2.0;
        let hd = self.depth / 2.0;
        [(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)].map(|(lx, ly)| {
            Point2::new(self.x + lx * cos - ly * sin, self.y + lx * sin + ly * cos)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Manual,
    Auto,
}

/// 尺寸标注线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DimensionKind,
    pub p1: Point2D,
    pub p2: Point2D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_position: Option<Point2D>,
    pub offset_distance: f64,
    #[serde(default)]
    pub is_temporary: bool,
    pub layer_id: String,
}

impl DimensionLine {
    pub fn measured_length(&self) -> f64 {
        (Point2::from(self.p2) - Point2::from(self.p1)).norm()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReply {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: String,
}

/// 图面批注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub replies: Vec<CommentReply>,
    pub layer_id: String,
}

impl Comment {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_rotation() {
        let model = PlacedModel {
            id: "m".into(),
            model_key: "sofa_3seat".into(),
            name: "Sofa".into(),
            x: 100.0,
            y: 100.0,
            width: 200.0,
            depth: 80.0,
            height3d: 85.0,
            rotation: 90.0,
            layer_id: "l".into(),
            brand: None,
            style: None,
        };
        let corners = model.footprint();
        // 旋转 90° 后宽度方向沿 y 轴
        assert!((corners[0].x - 140.0).abs() < 1e-9);
        assert!((corners[0].y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_length() {
        let dim = DimensionLine {
            id: "d".into(),
            kind: DimensionKind::Manual,
            p1: Point2D::new(0.0, 0.0),
            p2: Point2D::new(300.0, 400.0),
            text_position: None,
            offset_distance: 20.0,
            is_temporary: false,
            layer_id: "l".into(),
        };
        assert!((dim.measured_length() - 500.0).abs() < 1e-9);
    }
}
