//! Physics components for ECS entities.

use glam::{DVec3, Vec3};

use crate::physics::rigid_body::Body;
use crate::physics::shape::Shape;

/// Rigid body component.
///
/// The entity's [`Transform`](super::transform::Transform) is the source of
/// truth for the pose; the body's own position and orientation are
/// overwritten from it before every step.
#[derive(Debug, Clone)]
pub struct RigidBody(pub Body);

impl RigidBody {
    /// Create a new dynamic rigid body with the given shape and mass.
    pub fn new_dynamic(shape: Shape, mass: f32) -> Self {
        Self(Body::new_dynamic(shape, mass, DVec3::ZERO))
    }

    /// Create a new static rigid body.
    pub fn new_static(shape: Shape) -> Self {
        Self(Body::new_static(shape, DVec3::ZERO))
    }

    pub fn with_velocity(self, linear_velocity: Vec3) -> Self {
        Self(self.0.with_velocity(linear_velocity))
    }

    pub fn body(&self) -> &Body {
        &self.0
    }
}
