//! ZPlan 三维派生
//!
//! 从与二维平面相同的文档模型派生可渲染的三维实体：
//! - 墙体：围绕门窗洞口切分为实体段与过梁
//! - 房间：由边界墙唯一顶点构成的楼板
//! - 分区与道路：直接由路径数据生成
//!
//! 坐标约定：平面 (x, y) 映射到场景 (x, 高度, -y)。
//! 材质状态总是由 {文档, 选择} 重新派生，不做增量修改。

pub mod assets;
pub mod scene;
pub mod site;
pub mod wall;

pub use assets::{AssetLibrary, BuiltinAssets, MaterialParams, ModelParams};
pub use scene::{apply_selection, derive_scene, MaterialState, Scene, SceneNode, SceneObject};
pub use wall::{segment_wall, PartKind, WallAssembly, WallPart, MIN_SEGMENT};

use zplan_core::math::{Point2, Point3};

/// 平面点映射到场景坐标
#[inline]
pub fn plan_to_scene(p: Point2, height: f64) -> Point3 {
    Point3::new(p.x, height, -p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_to_scene_flips_depth() {
        let p = plan_to_scene(Point2::new(3.0, 4.0), 5.0);
        assert_eq!(p, Point3::new(3.0, 5.0, -4.0));
    }
}
