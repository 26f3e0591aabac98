//! 素材库接口
//!
//! 文档只保存 `model_key`/`material_key` 字符串，视觉参数由素材库解析。

use std::collections::HashMap;

/// 高亮材质 key
pub const HIGHLIGHT_MATERIAL: &str = "highlight";

/// 材质参数
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub color: u32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
}

impl MaterialParams {
    pub const fn solid(color: u32, roughness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness: 0.0,
            opacity: 1.0,
        }
    }
}

/// 模型参数
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// 资源路径（由宿主加载）
    pub uri: String,
    pub scale: f64,
}

/// 素材库
pub trait AssetLibrary {
    fn material(&self, key: &str) -> Option<MaterialParams>;

    fn model(&self, key: &str) -> Option<ModelParams>;
}

/// 内置素材表
#[derive(Debug, Clone)]
pub struct BuiltinAssets {
    materials: HashMap<String, MaterialParams>,
    models: HashMap<String, ModelParams>,
}

impl BuiltinAssets {
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        for (key, params) in [
            ("wall_default", MaterialParams::solid(0xe2e8f0, 0.9)),
            ("floor_default", MaterialParams::solid(0xcbd5e1, 0.8)),
            ("model_default", MaterialParams::solid(0x94a3b8, 0.7)),
            ("asphalt", MaterialParams::solid(0x334155, 0.95)),
            ("zone_default", MaterialParams::solid(0x94a3b8, 1.0)),
            ("oak", MaterialParams::solid(0xa16207, 0.6)),
            ("concrete", MaterialParams::solid(0x9ca3af, 0.95)),
            ("brick", MaterialParams::solid(0xb45309, 0.9)),
            (HIGHLIGHT_MATERIAL, MaterialParams::solid(0xf59e0b, 0.5)),
        ] {
            materials.insert(key.to_string(), params);
        }
        Self {
            materials,
            models: HashMap::new(),
        }
    }

    pub fn insert_material(&mut self, key: impl Into<String>, params: MaterialParams) {
        self.materials.insert(key.into(), params);
    }

    pub fn insert_model(&mut self, key: impl Into<String>, params: ModelParams) {
        self.models.insert(key.into(), params);
    }
}

impl Default for BuiltinAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLibrary for BuiltinAssets {
    fn material(&self, key: &str) -> Option<MaterialParams> {
        self.materials.get(key).cloned()
    }

    fn model(&self, key: &str) -> Option<ModelParams> {
        self.models.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let mut assets = BuiltinAssets::new();
        assert_eq!(assets.material(HIGHLIGHT_MATERIAL).map(|m| m.color), Some(0xf59e0b));
        assert!(assets.model("sofa").is_none());
        assets.insert_model(
            "sofa",
            ModelParams {
                uri: "models/sofa.glb".into(),
                scale: 1.0,
            },
        );
        assert!(assets.model("sofa").is_some());
    }
}
