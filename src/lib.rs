//! Bezel collision core
//!
//! Native rigid-body collision detection and response for convex shapes.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **physics::shape** - Sphere, box and convex hull shapes with support mapping
//! 2. **physics::broadphase** - Sweep and prune over swept bounds
//! 3. **physics::narrowphase** - GJK, EPA, sphere sweeps and conservative advancement
//! 4. **physics::solver** - Impulse-based contact resolution
//! 5. **physics** - Fixed timestep world stepping a slice of bodies
//! 6. **ecs** - hecs ECS integration (feature = "ecs")

pub mod error;
pub mod physics;

#[cfg(feature = "ecs")]
pub mod ecs;

// Re-export commonly used types
pub use error::{ConfigError, ShapeError};

pub use physics::{
    bounds::Bounds,
    broadphase::{broad_phase, CollisionPair},
    contact::{Contact, IntersectionPoint},
    narrowphase::{intersects, Proximity},
    rigid_body::Body,
    shape::{Shape, ShapeKind},
    PhysicsConfig, PhysicsWorld,
};

#[cfg(feature = "ecs")]
pub use ecs::prelude::*;

// Re-export glam for convenience
pub use glam;
