//! Contact data structures for collision response.

use glam::Vec3;

/// A contact point expressed both in world space and in the body's model
/// space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntersectionPoint {
    pub world: Vec3,
    pub model: Vec3,
}

/// Result of a narrow-phase test between two bodies of the same arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Witness point on body A.
    pub point_a: IntersectionPoint,
    /// Witness point on body B.
    pub point_b: IntersectionPoint,
    /// Unit contact normal pointing from A to B.
    pub normal: Vec3,
    /// Gap between the bodies. Negative when penetrating.
    pub separation_distance: f32,
    /// Seconds into the step at which the bodies touch.
    pub time_of_impact: f32,
    /// Arena index of body A.
    pub body_a: usize,
    /// Arena index of body B.
    pub body_b: usize,
}

impl Contact {
    pub fn new(body_a: usize, body_b: usize) -> Self {
        Self {
            point_a: IntersectionPoint::default(),
            point_b: IntersectionPoint::default(),
            normal: Vec3::ZERO,
            separation_distance: 0.0,
            time_of_impact: 0.0,
            body_a,
            body_b,
        }
    }

    /// True when the bodies overlap.
    pub fn is_penetrating(&self) -> bool {
        self.separation_distance < 0.0
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.point_a.world.is_finite()
            && self.point_b.world.is_finite()
            && self.normal.is_finite()
            && self.separation_distance.is_finite()
            && self.time_of_impact.is_finite()
    }
}
