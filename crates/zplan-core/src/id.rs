//! 实体 id 生成

use uuid::Uuid;

/// 生成形如 `wall_3f2a…` 的实体 id
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
