use serde::{Deserialize, Serialize};

/// 房间
///
/// 面积是派生值：由 `wall_ids` 引用的墙体顶点重新计算，`calculated_area` 只是缓存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub wall_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_material_override: Option<String>,
    pub layer_id: String,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        room_type: impl Into<String>,
        wall_ids: Vec<String>,
        layer_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            room_type: room_type.into(),
            wall_ids,
            calculated_area: None,
            orientation: None,
            floor_material: None,
            wall_material_override: None,
            layer_id: layer_id.into(),
        }
    }

    pub fn references_wall(&self, wall_id: &str) -> bool {
        self.wall_ids.iter().any(|id| id == wall_id)
    }
}
