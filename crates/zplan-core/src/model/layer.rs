use serde::{Deserialize, Serialize};

/// 默认图层 id
pub const DEFAULT_LAYER_ID: &str = "layer_default";

/// 图层
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub is_visible: bool,
    pub is_locked: bool,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_visible: true,
            is_locked: false,
        }
    }

    /// 可见且未锁定时才允许交互
    pub fn is_interactive(&self) -> bool {
        self.is_visible && !self.is_locked
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER_ID, "Default")
    }
}
