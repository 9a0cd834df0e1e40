//! Convex hull shape.

use glam::{Mat3, Quat, Vec3};

use crate::error::ShapeError;
use crate::physics::bounds::Bounds;

use super::hull::{build_convex_hull, hull_mass_properties, Triangle};

/// Convex polyhedron with mass properties computed at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexShape {
    vertices: Vec<Vec3>,
    triangles: Vec<Triangle>,
    bounds: Bounds,
    center_of_mass: Vec3,
    inertia_tensor: Mat3,
}

impl ConvexShape {
    /// Build the hull of `points` and integrate its mass properties.
    pub fn new(points: &[Vec3]) -> Result<Self, ShapeError> {
        let (vertices, triangles) = build_convex_hull(points)?;
        let bounds = Bounds::from_points(&vertices);
        let props = hull_mass_properties(&vertices, &triangles);

        if props.volume <= 0.0 {
            return Err(ShapeError::DegenerateHull);
        }

        Ok(Self {
            vertices,
            triangles,
            bounds,
            center_of_mass: props.center_of_mass,
            inertia_tensor: props.inertia_tensor,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn local_bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn center_of_mass(&self) -> Vec3 {
        self.center_of_mass
    }

    /// Unit-mass inertia about the center of mass.
    pub fn inertia_tensor(&self) -> Mat3 {
        self.inertia_tensor
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

    pub fn fastest_linear_speed(&self, angular_velocity: Vec3, dir: Vec3) -> f32 {
        self.vertices
            .iter()
            .map(|v| dir.dot(angular_velocity.cross(*v - self.center_of_mass)))
            .fold(0.0, f32::max)
    }
}
