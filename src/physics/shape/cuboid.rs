//! Box shape built as the axis-aligned hull of a point cloud.

use glam::{Mat3, Quat, Vec3};

use crate::error::ShapeError;
use crate::physics::bounds::Bounds;

/// Oriented box stored as its eight local-space corners.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    vertices: [Vec3; 8],
    bounds: Bounds,
}

impl BoxShape {
    /// Build the box enclosing `points` in local space.
    pub fn new(points: &[Vec3]) -> Result<Self, ShapeError> {
        if points.is_empty() {
            return Err(ShapeError::NoVertices);
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(ShapeError::NonFiniteVertex(i));
        }

        let bounds = Bounds::from_points(points);
        let (lo, hi) = (bounds.mins, bounds.maxs);
        let vertices = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ];
        Ok(Self { vertices, bounds })
    }

    /// Box centered on the local origin.
    pub fn from_half_extents(half_extents: Vec3) -> Result<Self, ShapeError> {
        let h = half_extents.abs();
        Self::new(&[-h, h])
    }

    pub fn vertices(&self) -> &[Vec3; 8] {
        &self.vertices
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.bounds.maxs - self.bounds.mins) * 0.5
    }

    pub fn local_bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn center_of_mass(&self) -> Vec3 {
        self.bounds.center()
    }

    pub fn support(&self, dir: Vec3, pos: Vec3, orientation: Quat, bias: f32) -> Vec3 {
        let local_dir = orientation.inverse() * dir;
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(local_dir);
        for v in &self.vertices[1..] {
            let d = v.dot(local_dir);
            if d > best_dot {
                best_dot = d;
                best = *v;
            }
        }
        orientation * best + pos + dir.normalize_or_zero() * bias
    }

    /// Unit-mass inertia about the local origin.
    pub fn inertia_tensor(&self) -> Mat3 {
        let dx = self.bounds.width_x();
        let dy = self.bounds.width_y();
        let dz = self.bounds.width_z();

        let tensor = Mat3::from_diagonal(Vec3::new(
            (dy * dy + dz * dz) / 12.0,
            (dx * dx + dz * dz) / 12.0,
            (dx * dx + dy * dy) / 12.0,
        ));

        // Parallel axis shift from the box center to the origin.
        let r = -self.center_of_mass();
        let r2 = r.dot(r);
        let shift = Mat3::from_cols(
            Vec3::new(r2 - r.x * r.x, -r.x * r.y, -r.x * r.z),
            Vec3::new(-r.y * r.x, r2 - r.y * r.y, -r.y * r.z),
            Vec3::new(-r.z * r.x, -r.z * r.y, r2 - r.z * r.z),
        );

        tensor + shift
    }

    pub fn fastest_linear_speed(&self, angular_velocity: Vec3, dir: Vec3) -> f32 {
        let com = self.center_of_mass();
        self.vertices
            .iter()
            .map(|v| dir.dot(angular_velocity.cross(*v - com)))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_box_from_cloud() {
        let b = BoxShape::new(&[
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.5),
            Vec3::new(0.0, -2.0, -0.5),
        ])
        .unwrap();
        assert_eq!(b.local_bounds().mins, Vec3::new(-1.0, -2.0, -0.5));
        assert_eq!(b.local_bounds().maxs, Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(b.half_extents(), Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_box_rejects_empty() {
        assert_eq!(BoxShape::new(&[]), Err(ShapeError::NoVertices));
    }

    #[test]
    fn test_box_support_axis_aligned() {
        let b = BoxShape::from_half_extents(Vec3::splat(0.5)).unwrap();
        let p = b.support(Vec3::X, Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, 0.0);
        let eps = 1e-5;
        assert!((p.x - 2.5).abs() < eps);

        let biased = b.support(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Quat::IDENTITY, 0.1);
        assert!((biased.x - 0.6).abs() < eps);
    }

    #[test]
    fn test_box_support_rotated() {
        let b = BoxShape::from_half_extents(Vec3::splat(0.5)).unwrap();
        let q = Quat::from_rotation_z(FRAC_PI_4);
        let p = b.support(Vec3::X, Vec3::ZERO, q, 0.0);
        // A corner swings onto the x axis.
        assert!((p.x - 0.5 * 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_box_inertia_centered() {
        let b = BoxShape::from_half_extents(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let i = b.inertia_tensor();
        let eps = 1e-4;
        assert!((i.x_axis.x - 208.0 / 48.0).abs() < eps);
        assert!((i.y_axis.y - 160.0 / 48.0).abs() < eps);
        assert!((i.z_axis.z - 80.0 / 48.0).abs() < eps);
    }

    #[test]
    fn test_box_inertia_parallel_axis() {
        let b = BoxShape::new(&[Vec3::new(1.0, -0.5, -0.5), Vec3::new(2.0, 0.5, 0.5)]).unwrap();
        let i = b.inertia_tensor();
        let eps = 1e-5;
        // Center at x = 1.5 shifts the y and z moments by 2.25.
        assert!((i.x_axis.x - 1.0 / 6.0).abs() < eps);
        assert!((i.y_axis.y - (1.0 / 6.0 + 2.25)).abs() < eps);
        assert!((i.z_axis.z - (1.0 / 6.0 + 2.25)).abs() < eps);
    }

    #[test]
    fn test_fastest_linear_speed() {
        let b = BoxShape::from_half_extents(Vec3::splat(0.5)).unwrap();
        // Spinning about z at 2 rad/s: corners move at most 2 * 0.5 along x.
        let speed = b.fastest_linear_speed(Vec3::new(0.0, 0.0, 2.0), Vec3::X);
        assert!((speed - 1.0).abs() < 1e-5);
        assert_eq!(b.fastest_linear_speed(Vec3::ZERO, Vec3::X), 0.0);
    }
}
