//! Broadphase collision detection using a 1-D sweep and prune.
//!
//! Each body's swept world AABB is projected onto the `(1, 1, 1)` diagonal
//! and the resulting intervals are sorted. Overlapping intervals become
//! candidate pairs.

use glam::Vec3;

use super::bounds::Bounds;
use super::rigid_body::Body;

/// Margin added to every swept AABB.
const BOUNDS_MARGIN: f32 = 0.01;

/// A candidate pair of arena indices. Order does not matter for equality.
#[derive(Debug, Clone, Copy, Eq)]
pub struct CollisionPair {
    pub a: usize,
    pub b: usize,
}

impl CollisionPair {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }
}

impl PartialEq for CollisionPair {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

/// One end of a body's projected interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoBody {
    pub id: usize,
    pub value: f32,
    pub is_min: bool,
}

/// World AABB of `body` swept over `dt` and padded by the margin.
pub fn swept_bounds(body: &Body, dt: f32) -> Bounds {
    let mut bounds = body.shape.bounds_at(body.position_f32(), body.orientation);
    bounds.sweep(body.linear_velocity * dt);
    bounds.inflate(BOUNDS_MARGIN);
    bounds
}

fn sorted_keys(bodies: &[Body], dt: f32) -> Vec<PseudoBody> {
    let axis = Vec3::ONE.normalize();
    let mut keys = Vec::with_capacity(bodies.len() * 2);
    for (id, body) in bodies.iter().enumerate() {
        let bounds = swept_bounds(body, dt);
        keys.push(PseudoBody {
            id,
            value: axis.dot(bounds.mins),
            is_min: true,
        });
        keys.push(PseudoBody {
            id,
            value: axis.dot(bounds.maxs),
            is_min: false,
        });
    }

    // Min keys sort ahead of max keys at equal values so touching
    // intervals still pair up.
    keys.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then_with(|| b.is_min.cmp(&a.is_min))
    });
    keys
}

/// Collect candidate pairs into `pairs`, clearing it first.
pub fn broad_phase_into(bodies: &[Body], pairs: &mut Vec<CollisionPair>, dt: f32) {
    pairs.clear();
    let keys = sorted_keys(bodies, dt);

    for (i, key) in keys.iter().enumerate() {
        if !key.is_min {
            continue;
        }
        for other in &keys[i + 1..] {
            if other.id == key.id {
                break;
            }
            if other.is_min {
                pairs.push(CollisionPair::new(key.id, other.id));
            }
        }
    }

    tracing::trace!(bodies = bodies.len(), pairs = pairs.len(), "broad phase");
}

/// Find all pairs of bodies whose swept bounds may overlap this step.
pub fn broad_phase(bodies: &[Body], dt: f32) -> Vec<CollisionPair> {
    let mut pairs = Vec::new();
    broad_phase_into(bodies, &mut pairs, dt);
    pairs
}
