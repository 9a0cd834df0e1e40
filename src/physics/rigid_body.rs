//! Rigid body state, impulses and integration.

use glam::{DVec3, Mat3, Quat, Vec3};

use super::shape::Shape;

/// Angular speed clamp in rad/s.
const MAX_ANGULAR_SPEED: f32 = 30.0;

/// A rigid body owning its collision shape.
///
/// `inv_mass == 0.0` marks a static body: impulses and integration leave it
/// untouched.
#[derive(Debug, Clone)]
pub struct Body {
    /// World-space origin of the body frame.
    pub position: DVec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub inv_mass: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub elasticity: f32,
    /// Friction coefficient (0.0 - 1.0).
    pub friction: f32,
    pub shape: Shape,
}

impl Body {
    /// Create a dynamic body of the given mass at `position`.
    ///
    /// A non-positive or non-finite mass yields a static body.
    pub fn new_dynamic(shape: Shape, mass: f32, position: DVec3) -> Self {
        let inv_mass = if mass.is_finite() && mass > 0.0 {
            1.0 / mass
        } else {
            0.0
        };
        Self {
            position,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inv_mass,
            elasticity: 0.5,
            friction: 0.5,
            shape,
        }
    }

    /// Create an immovable body at `position`.
    pub fn new_static(shape: Shape, position: DVec3) -> Self {
        Self {
            inv_mass: 0.0,
            ..Self::new_dynamic(shape, 0.0, position)
        }
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    pub fn with_velocity(mut self, linear_velocity: Vec3) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Position in single precision, as used by the collision queries.
    #[inline]
    pub fn position_f32(&self) -> Vec3 {
        self.position.as_vec3()
    }

    pub fn center_of_mass_model_space(&self) -> Vec3 {
        self.shape.center_of_mass()
    }

    pub fn center_of_mass_world_space(&self) -> Vec3 {
        self.model_to_world(self.shape.center_of_mass())
    }

    pub fn world_to_model(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position_f32())
    }

    pub fn model_to_world(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position_f32()
    }

    /// Inverse inertia tensor in body space, scaled by the inverse mass.
    pub fn inverse_inertia_tensor_body_space(&self) -> Mat3 {
        if self.is_static() {
            return Mat3::ZERO;
        }
        let tensor = self.shape.inertia_tensor();
        if tensor.determinant().abs() < f32::EPSILON {
            return Mat3::ZERO;
        }
        tensor.inverse() * self.inv_mass
    }

    pub fn inverse_inertia_tensor_world_space(&self) -> Mat3 {
        let rotation = Mat3::from_quat(self.orientation);
        rotation * self.inverse_inertia_tensor_body_space() * rotation.transpose()
    }

    pub fn apply_linear_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
    }

    /// Apply an angular impulse (change in angular momentum).
    pub fn apply_angular_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.angular_velocity += self.inverse_inertia_tensor_world_space() * impulse;
        if self.angular_velocity.length_squared() > MAX_ANGULAR_SPEED * MAX_ANGULAR_SPEED {
            self.angular_velocity = self.angular_velocity.normalize() * MAX_ANGULAR_SPEED;
        }
    }

    /// Apply `impulse` at the world-space `point`.
    pub fn apply_impulse(&mut self, point: Vec3, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.apply_linear_impulse(impulse);

        let r = point - self.center_of_mass_world_space();
        self.apply_angular_impulse(r.cross(impulse));
    }

    /// Advance position and orientation by `dt` seconds. Negative `dt`
    /// steps backwards.
    pub fn update(&mut self, dt: f32) {
        if self.is_static() {
            return;
        }

        let prev_position = self.position;
        let prev_orientation = self.orientation;

        self.position += (self.linear_velocity * dt).as_dvec3();

        // Rotate about the center of mass rather than the body origin.
        let com = self.center_of_mass_world_space().as_dvec3();
        let com_to_pos = (self.position - com).as_vec3();

        // Gyroscopic term: alpha = I^-1 (w x I w)
        let rotation = Mat3::from_quat(self.orientation);
        let inertia = rotation * self.shape.inertia_tensor() * rotation.transpose();
        if inertia.determinant().abs() > f32::EPSILON {
            let alpha = inertia.inverse()
                * self
                    .angular_velocity
                    .cross(inertia * self.angular_velocity);
            self.angular_velocity += alpha * dt;
        }

        let d_angle = self.angular_velocity * dt;
        let angle = d_angle.length();
        let dq = if angle > 0.0 {
            Quat::from_axis_angle(d_angle / angle, angle)
        } else {
            Quat::IDENTITY
        };
        self.orientation = (dq * self.orientation).normalize();
        self.position = com + (dq * com_to_pos).as_dvec3();

        if !self.is_finite() {
            tracing::warn!(
                position = ?prev_position,
                "non-finite body state after integration, resetting"
            );
            self.position = prev_position;
            self.orientation = prev_orientation;
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
    }

    /// True when every state component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.orientation.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}
