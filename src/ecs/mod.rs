//! hecs ECS integration.
//!
//! Entities carrying a [`Transform`](components::transform::Transform) and a
//! [`RigidBody`](components::physics::RigidBody) are simulated by
//! [`physics_system`](systems::physics::physics_system).

pub mod components;
pub mod systems;

pub mod prelude {
    pub use super::components::physics::RigidBody;
    pub use super::components::transform::Transform;
    pub use super::systems::physics::physics_system;
}
