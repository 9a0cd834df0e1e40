//! Closest point to the origin on a segment, triangle or tetrahedron,
//! returned as barycentric weights of the simplex vertices.
//!
//! Every routine falls back to a lower-dimensional answer when the simplex
//! is degenerate, so the weights are always finite, non-negative and sum
//! to one.

use glam::{Mat3, Vec2, Vec3, Vec4};

/// Squared-length threshold below which a segment or triangle is treated
/// as degenerate.
const DEGENERATE_EPSILON: f32 = 1e-8;

/// Slack allowed on barycentric signs before a point counts as outside.
const INSIDE_TOLERANCE: f32 = 1e-6;

/// True when `a` and `b` are both strictly positive or both strictly
/// negative.
#[inline]
fn same_sign(a: f32, b: f32) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

/// Weights `(l1, l2)` of the closest point to the origin on segment `s1 s2`.
pub fn project_on_1d(s1: Vec3, s2: Vec3) -> Vec2 {
    let ab = s2 - s1;
    let len_sq = ab.length_squared();
    if len_sq < DEGENERATE_EPSILON || !len_sq.is_finite() {
        return Vec2::new(1.0, 0.0);
    }

    let t = (-s1).dot(ab) / len_sq;
    if !t.is_finite() || t <= 0.0 {
        return Vec2::new(1.0, 0.0);
    }
    if t >= 1.0 {
        return Vec2::new(0.0, 1.0);
    }
    Vec2::new(1.0 - t, t)
}

/// Barycentric weights of `pt` projected onto the plane of `s1 s2 s3`,
/// computed in the coordinate plane where the triangle has the largest
/// area. Returns `None` for a degenerate triangle.
fn planar_barycentric(s1: Vec3, s2: Vec3, s3: Vec3, pt: Vec3) -> Option<Vec3> {
    let normal = (s2 - s1).cross(s3 - s1);
    let normal_sq = normal.length_squared();
    if normal_sq < DEGENERATE_EPSILON || !normal_sq.is_finite() {
        return None;
    }
    let p0 = pt + normal * ((s1 - pt).dot(normal) / normal_sq);

    // Pick the axis-aligned projection with the largest doubled area.
    let mut axis = 0;
    let mut area_max = 0.0f32;
    for i in 0..3 {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        let a = Vec2::new(s1[j], s1[k]);
        let b = Vec2::new(s2[j], s2[k]);
        let c = Vec2::new(s3[j], s3[k]);
        let area = (b - a).perp_dot(c - a);
        if area * area > area_max * area_max {
            axis = i;
            area_max = area;
        }
    }
    if area_max == 0.0 {
        return None;
    }

    let x = (axis + 1) % 3;
    let y = (axis + 2) % 3;
    let s = [
        Vec2::new(s1[x], s1[y]),
        Vec2::new(s2[x], s2[y]),
        Vec2::new(s3[x], s3[y]),
    ];
    let p = Vec2::new(p0[x], p0[y]);

    // Sub-area opposite each vertex.
    let mut areas = Vec3::ZERO;
    for i in 0..3 {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        areas[i] = (s[j] - p).perp_dot(s[k] - p);
    }

    let lambdas = areas / area_max;
    lambdas.is_finite().then_some(lambdas)
}

/// Weights `(l1, l2, l3)` of the closest point to the origin on triangle
/// `s1 s2 s3`.
pub fn project_on_2d(s1: Vec3, s2: Vec3, s3: Vec3) -> Vec3 {
    if let Some(lambdas) = planar_barycentric(s1, s2, s3, Vec3::ZERO) {
        if lambdas.min_element() >= -INSIDE_TOLERANCE {
            return lambdas.max(Vec3::ZERO) / lambdas.max(Vec3::ZERO).element_sum();
        }
    }

    // Origin projects outside the triangle: best of the vertices and edges.
    let pts = [s1, s2, s3];
    let mut best = Vec3::X;
    let mut best_dist = f32::MAX;

    for (i, p) in pts.iter().enumerate() {
        let d = p.length_squared();
        if d < best_dist {
            best_dist = d;
            best = Vec3::ZERO;
            best[i] = 1.0;
        }
    }

    for i in 0..3 {
        let k = (i + 1) % 3;
        let l = (i + 2) % 3;
        let edge = project_on_1d(pts[k], pts[l]);
        let pt = pts[k] * edge.x + pts[l] * edge.y;
        let d = pt.length_squared();
        if d < best_dist {
            best_dist = d;
            best = Vec3::ZERO;
            best[k] = edge.x;
            best[l] = edge.y;
        }
    }

    best
}

/// Weights `(l1, l2, l3, l4)` of the closest point to the origin on or in
/// tetrahedron `s1 s2 s3 s4`.
pub fn project_on_3d(s1: Vec3, s2: Vec3, s3: Vec3, s4: Vec3) -> Vec4 {
    let pts = [s1, s2, s3, s4];

    // Cofactors along the last row of [s1 s2 s3 s4; 1 1 1 1].
    let mut cofactors = Vec4::ZERO;
    for i in 0..4 {
        let mut cols = [Vec3::ZERO; 3];
        let mut n = 0;
        for (j, p) in pts.iter().enumerate() {
            if j != i {
                cols[n] = *p;
                n += 1;
            }
        }
        let minor = Mat3::from_cols(cols[0], cols[1], cols[2]).determinant();
        let sign = if (3 + i) % 2 == 0 { 1.0 } else { -1.0 };
        cofactors[i] = sign * minor;
    }
    let det = cofactors.element_sum();

    if det.abs() > DEGENERATE_EPSILON
        && det.is_finite()
        && (0..4).all(|i| same_sign(det, cofactors[i]))
    {
        return cofactors / det;
    }

    // Origin is outside (or the volume vanished): best of the four faces.
    let mut best = Vec4::X;
    let mut best_dist = f32::MAX;
    for i in 0..4 {
        let j = (i + 1) % 4;
        let k = (i + 2) % 4;
        let face = project_on_2d(pts[i], pts[j], pts[k]);
        let pt = pts[i] * face.x + pts[j] * face.y + pts[k] * face.z;
        let d = pt.length_squared();
        if d < best_dist {
            best_dist = d;
            best = Vec4::ZERO;
            best[i] = face.x;
            best[j] = face.y;
            best[k] = face.z;
        }
    }
    best
}

/// Unclamped barycentric coordinates of `pt` projected onto the plane of
/// `s1 s2 s3`. A degenerate triangle yields `(1, 0, 0)`.
pub fn barycentric_coordinates(s1: Vec3, s2: Vec3, s3: Vec3, pt: Vec3) -> Vec3 {
    planar_barycentric(s1, s2, s3, pt).unwrap_or(Vec3::X)
}
