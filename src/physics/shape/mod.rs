//! Collision shapes and their support mappings.
//!
//! Every shape answers the same set of queries: the support point along a
//! direction, world and local bounds, a unit-mass inertia tensor and the
//! fastest surface speed of a spinning shape. GJK and EPA only ever touch
//! geometry through [`Shape::support`].

pub mod convex;
pub mod cuboid;
pub mod hull;

use glam::{Mat3, Quat, Vec3};

use crate::error::ShapeError;

use super::bounds::Bounds;

pub use self::convex::ConvexShape;
pub use self::cuboid::BoxShape;
pub use self::hull::{build_convex_hull, Edge, Triangle};

/// Shape discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Box,
    Convex,
}

/// Convex collision shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box(BoxShape),
    Convex(ConvexShape),
}

impl Shape {
    /// Sphere centered on the local origin.
    pub fn sphere(radius: f32) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Shape::Sphere { radius })
    }

    /// Axis-aligned box enclosing `points`.
    pub fn cuboid(points: &[Vec3]) -> Result<Self, ShapeError> {
        BoxShape::new(points).map(Shape::Box)
    }

    /// Box centered on the local origin.
    pub fn from_half_extents(half_extents: Vec3) -> Result<Self, ShapeError> {
        BoxShape::from_half_extents(half_extents).map(Shape::Box)
    }

    /// Convex hull of `points`.
    pub fn convex(points: &[Vec3]) -> Result<Self, ShapeError> {
        ConvexShape::new(points).map(Shape::Convex)
    }

    /// Rebuild a box or hull from a new point cloud, keeping its kind.
    /// A sphere is rebuilt with the farthest point's distance as radius.
    pub fn build(&mut self, points: &[Vec3]) -> Result<(), ShapeError> {
        let rebuilt = match self.kind() {
            ShapeKind::Sphere => {
                if points.is_empty() {
                    return Err(ShapeError::NoVertices);
                }
                let radius = points.iter().map(|p| p.length()).fold(0.0, f32::max);
                Shape::sphere(radius)?
            }
            ShapeKind::Box => Shape::cuboid(points)?,
            ShapeKind::Convex => Shape::convex(points)?,
        };
        *self = rebuilt;
        Ok(())
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Box(_) => ShapeKind::Box,
            Shape::Convex(_) => ShapeKind::Convex,
        }
    }

    /// Sphere radius, if this is a sphere.
    pub fn radius(&self) -> Option<f32> {
        match self {
            Shape::Sphere { radius } => Some(*radius),
            _ => None,
        }
    }

    /// Extreme world-space point along `dir` of the shape placed at `pos`
    /// with `orientation`, pushed out by `bias` along `dir`.
    #[inline]
    pub fn support(&self, dir: Vec3, pos: Vec3, orientation: Quat, bias: f32) -> Vec3 {
        match self {
            Shape::Sphere { radius } => pos + dir.normalize_or_zero() * (radius + bias),
            Shape::Box(b) => b.support(dir, pos, orientation, bias),
            Shape::Convex(c) => c.support(dir, pos, orientation, bias),
        }
    }

    /// Local-space bounds.
    pub fn local_bounds(&self) -> Bounds {
        match self {
            Shape::Sphere { radius } => {
                Bounds::from_min_max(Vec3::splat(-radius), Vec3::splat(*radius))
            }
            Shape::Box(b) => b.local_bounds(),
            Shape::Convex(c) => c.local_bounds(),
        }
    }

    /// World-space bounds of the shape placed at `pos` with `orientation`.
    pub fn bounds_at(&self, pos: Vec3, orientation: Quat) -> Bounds {
        match self {
            Shape::Sphere { radius } => {
                Bounds::from_min_max(pos - Vec3::splat(*radius), pos + Vec3::splat(*radius))
            }
            _ => {
                let mut bounds = Bounds::new();
                for corner in self.local_bounds().corners() {
                    bounds.expand_point(orientation * corner + pos);
                }
                bounds
            }
        }
    }

    /// Inertia tensor for a unit mass, in body space.
    pub fn inertia_tensor(&self) -> Mat3 {
        match self {
            Shape::Sphere { radius } => Mat3::from_diagonal(Vec3::splat(0.4 * radius * radius)),
            Shape::Box(b) => b.inertia_tensor(),
            Shape::Convex(c) => c.inertia_tensor(),
        }
    }

    /// Center of mass in body space.
    pub fn center_of_mass(&self) -> Vec3 {
        match self {
            Shape::Sphere { .. } => Vec3::ZERO,
            Shape::Box(b) => b.center_of_mass(),
            Shape::Convex(c) => c.center_of_mass(),
        }
    }

    /// Largest speed along `dir` of any surface point when the shape spins
    /// with `angular_velocity` about its center of mass. Both vectors are in
    /// body space.
    pub fn fastest_linear_speed(&self, angular_velocity: Vec3, dir: Vec3) -> f32 {
        match self {
            Shape::Sphere { .. } => 0.0,
            Shape::Box(b) => b.fastest_linear_speed(angular_velocity, dir),
            Shape::Convex(c) => c.fastest_linear_speed(angular_velocity, dir),
        }
    }
}
