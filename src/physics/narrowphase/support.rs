//! Support points on the Minkowski difference of two bodies.

use glam::Vec3;

use crate::physics::rigid_body::Body;

/// Point of the Minkowski difference `A - B` together with the witness
/// points on each body that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SupportPoint {
    /// `pt_a - pt_b`
    pub xyz: Vec3,
    /// World-space point on A.
    pub pt_a: Vec3,
    /// World-space point on B.
    pub pt_b: Vec3,
}

impl SupportPoint {
    pub fn new(pt_a: Vec3, pt_b: Vec3) -> Self {
        Self {
            xyz: pt_a - pt_b,
            pt_a,
            pt_b,
        }
    }
}

/// Extreme point of `A - B` along `dir`, each shape inflated by `bias`.
#[inline]
pub fn support(body_a: &Body, body_b: &Body, dir: Vec3, bias: f32) -> SupportPoint {
    let dir = dir.normalize_or_zero();
    let pt_a = body_a
        .shape
        .support(dir, body_a.position_f32(), body_a.orientation, bias);
    let pt_b = body_b
        .shape
        .support(-dir, body_b.position_f32(), body_b.orientation, bias);
    SupportPoint::new(pt_a, pt_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::Shape;
    use glam::DVec3;

    #[test]
    fn test_sphere_minkowski_support() {
        let a = Body::new_dynamic(Shape::sphere(1.0).unwrap(), 1.0, DVec3::ZERO);
        let b = Body::new_dynamic(Shape::sphere(0.5).unwrap(), 1.0, DVec3::new(3.0, 0.0, 0.0));

        let p = support(&a, &b, Vec3::new(2.0, 0.0, 0.0), 0.0);
        let eps = 1e-5;
        assert!((p.pt_a - Vec3::new(1.0, 0.0, 0.0)).length() < eps);
        assert!((p.pt_b - Vec3::new(2.5, 0.0, 0.0)).length() < eps);
        assert!((p.xyz - Vec3::new(-1.5, 0.0, 0.0)).length() < eps);
    }

    #[test]
    fn test_bias_inflates_both_sides() {
        let a = Body::new_dynamic(Shape::sphere(1.0).unwrap(), 1.0, DVec3::ZERO);
        let b = Body::new_dynamic(Shape::sphere(1.0).unwrap(), 1.0, DVec3::ZERO);
        let p = support(&a, &b, Vec3::Y, 0.1);
        assert!((p.xyz.y - 2.2).abs() < 1e-5);
    }
}
