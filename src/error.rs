//! Error types for shape construction and world configuration.

use thiserror::Error;

/// Errors raised while building a collision shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// The point cloud handed to a shape builder was empty.
    #[error("shape requires at least one vertex")]
    NoVertices,

    /// A convex hull needs at least four points.
    #[error("convex hull requires at least 4 points, got {0}")]
    TooFewPoints(usize),

    /// The points are (nearly) coplanar, so they enclose no volume.
    #[error("convex hull is degenerate: input points are collinear or coplanar")]
    DegenerateHull,

    /// Some coordinate was NaN or infinite.
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),

    /// Sphere radius must be a positive finite number.
    #[error("invalid sphere radius {0}")]
    InvalidRadius(f32),
}

/// Errors raised by [`PhysicsConfig::validate`](crate::physics::PhysicsConfig::validate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    #[error("max substeps must be at least 1")]
    NoSubsteps,

    #[error("max delta must be positive and finite, got {0}")]
    InvalidMaxDelta(f64),

    #[error("gravity must be finite")]
    NonFiniteGravity,
}
