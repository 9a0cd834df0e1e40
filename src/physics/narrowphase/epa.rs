//! Expanding polytope algorithm: penetration depth, contact normal and
//! witness points of two overlapping bodies.

use glam::Vec3;

use crate::physics::rigid_body::Body;
use crate::physics::shape::hull::{find_dangling_edges, Triangle};

use super::projection::barycentric_coordinates;
use super::support::{support, SupportPoint};

/// Hard cap on polytope expansions.
pub const EPA_MAX_ITERATIONS: usize = 64;

/// Squared distance under which a new support point matches a polytope
/// vertex.
const VERTEX_EPSILON_SQ: f32 = 1e-6;

/// Minimum progress of a new support point past the closest face.
const PROGRESS_EPSILON: f32 = 1e-6;

/// Witness separation below which the face distance is used as depth.
const DEPTH_EPSILON: f32 = 1e-6;

/// Penetration of body A into body B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Deepest point of A, in world space.
    pub point_a: Vec3,
    /// Deepest point of B, in world space.
    pub point_b: Vec3,
    /// Unit normal pointing from A to B.
    pub normal: Vec3,
    pub depth: f32,
}

/// Vertex positions of the polytope, for the triangle helpers.
fn positions(points: &[SupportPoint]) -> Vec<Vec3> {
    points.iter().map(|p| p.xyz).collect()
}

/// Index of the face whose plane is closest to the origin.
fn closest_triangle(triangles: &[Triangle], xyz: &[Vec3]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, tri) in triangles.iter().enumerate() {
        let dist = tri.signed_distance(xyz, Vec3::ZERO);
        let dist_sq = dist * dist;
        if dist_sq < best_dist {
            best_dist = dist_sq;
            best = i;
        }
    }
    best
}

fn has_point(pt: Vec3, triangles: &[Triangle], xyz: &[Vec3]) -> bool {
    triangles.iter().any(|tri| {
        [tri.a, tri.b, tri.c]
            .iter()
            .any(|&i| (pt - xyz[i]).length_squared() < VERTEX_EPSILON_SQ)
    })
}

/// Remove every face that has `pt` in front of it. Returns how many were
/// removed.
fn remove_triangles_facing_point(pt: Vec3, triangles: &mut Vec<Triangle>, xyz: &[Vec3]) -> usize {
    let before = triangles.len();
    triangles.retain(|tri| tri.signed_distance(xyz, pt) <= 0.0);
    before - triangles.len()
}

/// Expand a tetrahedron enclosing the origin of `A - B` until its closest
/// face lies on the boundary of the Minkowski difference.
///
/// `simplex` must hold at least four points; extra points are ignored.
pub fn epa_expand(body_a: &Body, body_b: &Body, bias: f32, simplex: &[SupportPoint]) -> Penetration {
    expand_polytope(body_a, body_b, bias, simplex, EPA_MAX_ITERATIONS).0
}

/// Runs at most `max_iterations` expansions. The flag is set when the cap
/// stopped the loop rather than convergence.
fn expand_polytope(
    body_a: &Body,
    body_b: &Body,
    bias: f32,
    simplex: &[SupportPoint],
    max_iterations: usize,
) -> (Penetration, bool) {
    let mut points: Vec<SupportPoint> = simplex.iter().take(4).copied().collect();
    let mut xyz = positions(&points);
    let center = xyz.iter().copied().sum::<Vec3>() * 0.25;

    // Wind every starting face so that the unused vertex lies behind it.
    let mut triangles = Vec::with_capacity(32);
    for i in 0..4 {
        let mut tri = Triangle::new(i, (i + 1) % 4, (i + 2) % 4);
        let unused = (i + 3) % 4;
        if tri.signed_distance(&xyz, xyz[unused]) > 0.0 {
            std::mem::swap(&mut tri.a, &mut tri.b);
        }
        triangles.push(tri);
    }

    let mut iterations = 0;
    let mut capped = false;
    loop {
        if iterations == max_iterations {
            tracing::debug!(
                faces = triangles.len(),
                "EPA hit the iteration cap, using the best face so far"
            );
            capped = true;
            break;
        }
        iterations += 1;

        let idx = closest_triangle(&triangles, &xyz);
        let normal = triangles[idx].normal(&xyz);
        let new_pt = support(body_a, body_b, normal, bias);

        if has_point(new_pt.xyz, &triangles, &xyz) {
            break;
        }
        if triangles[idx].signed_distance(&xyz, new_pt.xyz) <= PROGRESS_EPSILON {
            break;
        }

        let new_idx = points.len();
        points.push(new_pt);
        xyz.push(new_pt.xyz);

        let snapshot = triangles.clone();
        if remove_triangles_facing_point(new_pt.xyz, &mut triangles, &xyz) == 0 {
            break;
        }

        let dangling = find_dangling_edges(&triangles);
        if dangling.is_empty() {
            triangles = snapshot;
            break;
        }

        for edge in dangling {
            let mut tri = Triangle::new(new_idx, edge.b, edge.a);
            if tri.signed_distance(&xyz, center) > 0.0 {
                std::mem::swap(&mut tri.b, &mut tri.c);
            }
            triangles.push(tri);
        }
    }

    let tri = triangles[closest_triangle(&triangles, &xyz)];
    let lambdas = barycentric_coordinates(xyz[tri.a], xyz[tri.b], xyz[tri.c], Vec3::ZERO);

    let point_a = points[tri.a].pt_a * lambdas.x
        + points[tri.b].pt_a * lambdas.y
        + points[tri.c].pt_a * lambdas.z;
    let point_b = points[tri.a].pt_b * lambdas.x
        + points[tri.b].pt_b * lambdas.y
        + points[tri.c].pt_b * lambdas.z;

    let face_normal = tri.normal(&xyz);
    let delta = point_b - point_a;
    let mut depth = delta.length();
    let mut normal = if depth > DEPTH_EPSILON {
        delta / depth
    } else {
        depth = tri.signed_distance(&xyz, Vec3::ZERO).abs();
        face_normal
    };

    // Point the normal from A towards B.
    let center_delta = body_b.center_of_mass_world_space() - body_a.center_of_mass_world_space();
    let reference = if center_delta.length_squared() > 1e-12 {
        center_delta
    } else {
        face_normal
    };
    if normal.dot(reference) < 0.0 {
        normal = -normal;
    }

    let penetration = Penetration {
        point_a,
        point_b,
        normal,
        depth,
    };
    (penetration, capped)
}
