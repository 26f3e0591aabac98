//! 编辑器配置
//!
//! 所有字段都有默认值，配置文件中缺省的字段会回落到默认值。

use crate::model::OpeningKind;
use crate::snap::SnapConfig;
use serde::{Deserialize, Serialize};

/// 门窗默认尺寸
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub snap: SnapConfig,
    /// 新墙默认厚度
    pub wall_thickness: f64,
    /// 新墙默认高度
    pub wall_height: f64,
    pub door: OpeningSize,
    pub window: OpeningSize,
    /// 尺寸标注默认偏移
    pub dimension_offset: f64,
    /// 撤销栈最大深度
    pub history_depth: usize,
    /// 远端光标/选择的存活时间（秒）
    pub presence_timeout_secs: u64,
    /// 光标广播最小间隔（毫秒）
    pub cursor_interval_ms: u64,
}

impl PlanConfig {
    pub fn opening_size(&self, kind: OpeningKind) -> OpeningSize {
        match kind {
            OpeningKind::Door => self.door,
            OpeningKind::Window => self.window,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            wall_thickness: 10.0,
            wall_height: 240.0,
            door: OpeningSize {
                width: 90.0,
                height: 210.0,
            },
            window: OpeningSize {
                width: 120.0,
                height: 100.0,
            },
            dimension_offset: 20.0,
            history_depth: 50,
            presence_timeout_secs: 30,
            cursor_interval_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PlanConfig =
            serde_json::from_str(r#"{ "wall_height": 300.0, "snap": { "grid_size": 10.0 } }"#).unwrap();
        assert_eq!(config.wall_height, 300.0);
        assert_eq!(config.wall_thickness, 10.0);
        assert_eq!(config.snap.grid_size, 10.0);
        assert_eq!(config.snap.threshold, 15.0);
        assert_eq!(config.history_depth, 50);
    }

    #[test]
    fn test_opening_size() {
        let config = PlanConfig::default();
        assert_eq!(config.opening_size(OpeningKind::Door).width, 90.0);
        assert_eq!(config.opening_size(OpeningKind::Window).height, 100.0);
    }
}
