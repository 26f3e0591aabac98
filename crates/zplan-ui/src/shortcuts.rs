//! 工具快捷键注册表

use crate::state::SketchTool;
use std::collections::HashMap;

/// 单键快捷键 -> 草图工具（不区分大小写）
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    keys: HashMap<char, SketchTool>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            keys: HashMap::new(),
        };
        for tool in SketchTool::ALL {
            for key in tool.shortcut().chars() {
                registry.register(key, tool);
            }
        }
        registry
    }

    /// 绑定快捷键；返回被替换的工具
    pub fn register(&mut self, key: char, tool: SketchTool) -> Option<SketchTool> {
        self.keys.insert(key.to_ascii_uppercase(), tool)
    }

    pub fn lookup_key(&self, key: char) -> Option<SketchTool> {
        self.keys.get(&key.to_ascii_uppercase()).copied()
    }
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}
