//! 项目级场地数据：分区、道路/管线、用地红线、地形、渲染与相机

use super::{Point2D, Point3D};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Residential,
    Commercial,
    GreenSpace,
    Infrastructure,
}

impl ZoneType {
    pub fn name(&self) -> &'static str {
        match self {
            ZoneType::Residential => "居住",
            ZoneType::Commercial => "商业",
            ZoneType::GreenSpace => "绿地",
            ZoneType::Infrastructure => "基础设施",
        }
    }

    /// 分区填充色（平面与三维共用）
    pub fn color(&self) -> u32 {
        match self {
            ZoneType::Residential => 0x2563eb,
            ZoneType::Commercial => 0xf59e0b,
            ZoneType::GreenSpace => 0x10b981,
            ZoneType::Infrastructure => 0x64748b,
        }
    }
}

/// 规划分区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub path: Vec<Point2D>,
    pub layer_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    Road,
    UtilityLine,
}

/// 线状基础设施
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InfrastructureKind,
    pub path: Vec<Point2D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub layer_id: String,
}

/// 用地红线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLine {
    pub id: String,
    pub points: Vec<Point2D>,
}

/// 地形网格（顶点为 xyz 平铺数组）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainMesh {
    pub vertices: Vec<f64>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Midday,
    Sunset,
    Night,
}

/// 场景渲染设置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingSettings {
    pub time_of_day: TimeOfDay,
    pub enable_bloom: bool,
}

/// 保存的相机视角
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub id: String,
    pub name: String,
    pub position: Point3D,
    pub target: Point3D,
}
