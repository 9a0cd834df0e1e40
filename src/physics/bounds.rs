//! Axis-aligned bounding boxes used by shapes and the broad phase.

use glam::Vec3;

/// Axis-aligned bounding box.
///
/// A fresh box is empty (`mins = +inf`, `maxs = -inf`) so that the first
/// call to one of the `expand` methods establishes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// Create an empty bounding box.
    pub fn new() -> Self {
        Self {
            mins: Vec3::INFINITY,
            maxs: Vec3::NEG_INFINITY,
        }
    }

    /// Create a bounding box from explicit corners.
    pub fn from_min_max(mins: Vec3, maxs: Vec3) -> Self {
        Self { mins, maxs }
    }

    /// Build the tightest box around a set of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bounds = Self::new();
        bounds.expand_points(points);
        bounds
    }

    /// Reset to the empty box.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// True when nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.mins.x > self.maxs.x || self.mins.y > self.maxs.y || self.mins.z > self.maxs.z
    }

    /// Test whether two boxes overlap. Touching boxes count as overlapping.
    #[inline]
    pub fn does_intersect(&self, other: &Bounds) -> bool {
        if self.maxs.x < other.mins.x || self.maxs.y < other.mins.y || self.maxs.z < other.mins.z
        {
            return false;
        }
        if self.mins.x > other.maxs.x || self.mins.y > other.maxs.y || self.mins.z > other.maxs.z
        {
            return false;
        }
        true
    }

    /// Grow the box to contain `point`.
    #[inline]
    pub fn expand_point(&mut self, point: Vec3) {
        self.mins = self.mins.min(point);
        self.maxs = self.maxs.max(point);
    }

    /// Grow the box to contain every point in `points`.
    pub fn expand_points(&mut self, points: &[Vec3]) {
        for p in points {
            self.expand_point(*p);
        }
    }

    /// Grow the box to contain `other`.
    pub fn expand_bounds(&mut self, other: &Bounds) {
        self.mins = self.mins.min(other.mins);
        self.maxs = self.maxs.max(other.maxs);
    }

    /// Enlarge the box along a displacement, covering both the start and
    /// the end position of a body moving by `displacement`.
    pub fn sweep(&mut self, displacement: Vec3) {
        let mins = self.mins + displacement;
        let maxs = self.maxs + displacement;
        self.expand_point(mins);
        self.expand_point(maxs);
    }

    /// Inflate the box by `margin` on every side.
    pub fn inflate(&mut self, margin: f32) {
        let mins = self.mins - Vec3::splat(margin);
        let maxs = self.maxs + Vec3::splat(margin);
        self.expand_point(mins);
        self.expand_point(maxs);
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.mins, self.maxs);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    #[inline]
    pub fn width_x(&self) -> f32 {
        self.maxs.x - self.mins.x
    }

    #[inline]
    pub fn width_y(&self) -> f32 {
        self.maxs.y - self.mins.y
    }

    #[inline]
    pub fn width_z(&self) -> f32 {
        self.maxs.z - self.mins.z
    }

    /// Center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.mins + self.maxs) * 0.5
    }
}
