//! 数学类型
//!
//! 平面坐标使用 nalgebra 的双精度点/向量，单位为平面单位（厘米）。

pub use nalgebra::{Isometry3, Translation3, UnitQuaternion};

pub type Point2 = nalgebra::Point2<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// 通用浮点容差
pub const EPSILON: f64 = 1e-9;

/// 两点是否（在容差内）重合
#[inline]
pub fn approx_eq(a: Point2, b: Point2) -> bool {
    (a - b).norm() <= EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_within_tolerance() {
        let a = Point2::new(10.0, -5.0);
        assert!(approx_eq(a, Point2::new(10.0 + EPSILON / 2.0, -5.0)));
        assert!(!approx_eq(a, Point2::new(10.0, -5.0 + 1e-6)));
    }
}
