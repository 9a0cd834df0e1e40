//! Gilbert-Johnson-Keerthi distance and intersection queries using the
//! signed-volume simplex reduction.

use glam::{Vec3, Vec4};

use crate::physics::rigid_body::Body;

use super::epa::{epa_expand, Penetration};
use super::projection::{project_on_1d, project_on_2d, project_on_3d};
use super::support::{support, SupportPoint};

/// Hard cap on simplex refinement steps.
pub const GJK_MAX_ITERATIONS: usize = 64;

/// Two support points closer than this are the same point.
const DUPLICATE_EPSILON: f32 = 1e-6;

/// Squared distance at which the origin counts as reached.
const CONTAINMENT_EPSILON: f32 = 1e-8;

/// Reduce `points` to the closest feature to the origin.
///
/// Returns whether the origin lies in the simplex, the next search
/// direction (towards the origin from the closest point) and the
/// barycentric weight of each point.
pub fn simplex_signed_volumes(points: &[SupportPoint]) -> (bool, Vec3, Vec4) {
    let mut lambdas = Vec4::ZERO;
    match points.len() {
        1 => {
            lambdas.x = 1.0;
        }
        2 => {
            let l = project_on_1d(points[0].xyz, points[1].xyz);
            lambdas.x = l.x;
            lambdas.y = l.y;
        }
        3 => {
            let l = project_on_2d(points[0].xyz, points[1].xyz, points[2].xyz);
            lambdas = l.extend(0.0);
        }
        4 => {
            lambdas = project_on_3d(points[0].xyz, points[1].xyz, points[2].xyz, points[3].xyz);
        }
        _ => return (false, Vec3::ZERO, lambdas),
    }

    let closest: Vec3 = points
        .iter()
        .enumerate()
        .map(|(i, p)| p.xyz * lambdas[i])
        .sum();
    let contains_origin = closest.length_squared() < CONTAINMENT_EPSILON;
    (contains_origin, -closest, lambdas)
}

/// True if `pt` already appears in `simplex` (within a small distance).
pub fn has_point(simplex: &[SupportPoint], pt: &SupportPoint) -> bool {
    simplex
        .iter()
        .any(|p| (p.xyz - pt.xyz).length_squared() < DUPLICATE_EPSILON * DUPLICATE_EPSILON)
}

/// Move points with a non-zero weight to the front, keeping their order.
pub fn sort_valids(simplex: &mut Vec<SupportPoint>, lambdas: &mut Vec4) {
    let mut kept = Vec4::ZERO;
    let mut n = 0;
    let mut i = 0;
    simplex.retain(|_| {
        let keep = lambdas[i] != 0.0;
        if keep {
            kept[n] = lambdas[i];
            n += 1;
        }
        i += 1;
        keep
    });
    *lambdas = kept;
}

/// Number of non-zero weights.
pub fn num_valids(lambdas: Vec4) -> usize {
    (0..4).filter(|&i| lambdas[i] != 0.0).count()
}

/// Grow a simplex that contains the origin into a tetrahedron, as EPA
/// needs a volume to start from.
fn expand_to_tetrahedron(body_a: &Body, body_b: &Body, simplex: &mut Vec<SupportPoint>) {
    if simplex.len() == 1 {
        let dir = -simplex[0].xyz;
        let dir = if dir.length_squared() > CONTAINMENT_EPSILON {
            dir
        } else {
            Vec3::X
        };
        push_unique(body_a, body_b, simplex, dir);
    }
    if simplex.len() == 2 {
        let ab = simplex[1].xyz - simplex[0].xyz;
        push_unique(body_a, body_b, simplex, ab.any_orthogonal_vector());
    }
    if simplex.len() == 3 {
        let ab = simplex[1].xyz - simplex[0].xyz;
        let ac = simplex[2].xyz - simplex[0].xyz;
        let n = ab.cross(ac);
        let n = if n.length_squared() > CONTAINMENT_EPSILON {
            n
        } else {
            ab.any_orthogonal_vector()
        };
        push_unique(body_a, body_b, simplex, n);
    }
}

/// Add the support point along `dir`, or along `-dir` if the first one is
/// already in the simplex.
fn push_unique(body_a: &Body, body_b: &Body, simplex: &mut Vec<SupportPoint>, dir: Vec3) {
    for d in [dir, -dir] {
        let pt = support(body_a, body_b, d, 0.0);
        if !has_point(simplex, &pt) {
            simplex.push(pt);
            return;
        }
    }
}

/// Test whether the bodies overlap. On overlap, the terminal simplex is
/// inflated by `bias` and expanded by EPA into a penetration estimate.
pub fn gjk_intersection(body_a: &Body, body_b: &Body, bias: f32) -> Option<Penetration> {
    let mut simplex = Vec::with_capacity(4);
    simplex.push(support(body_a, body_b, Vec3::X, 0.0));

    let mut closest_dist = f32::MAX;
    let mut new_dir = -simplex[0].xyz;
    let mut contains_origin = false;

    for _ in 0..GJK_MAX_ITERATIONS {
        let new_pt = support(body_a, body_b, new_dir, 0.0);
        if has_point(&simplex, &new_pt) {
            break;
        }

        // A point that does not pass the origin proves separation.
        if new_dir.dot(new_pt.xyz) < 0.0 {
            break;
        }
        simplex.push(new_pt);

        let (inside, dir, mut lambdas) = simplex_signed_volumes(&simplex);
        if inside {
            contains_origin = true;
            break;
        }

        let dist = dir.length_squared();
        if dist >= closest_dist {
            break;
        }
        closest_dist = dist;
        new_dir = dir;

        sort_valids(&mut simplex, &mut lambdas);
        if num_valids(lambdas) == 4 {
            contains_origin = true;
            break;
        }
    }

    if !contains_origin {
        return None;
    }

    expand_to_tetrahedron(body_a, body_b, &mut simplex);
    if simplex.len() < 4 {
        tracing::trace!(len = simplex.len(), "touching contact, no volume for EPA");
        return None;
    }

    // Inflate the tetrahedron by the bias.
    let center = simplex.iter().map(|p| p.xyz).sum::<Vec3>() * 0.25;
    for p in simplex.iter_mut() {
        let dir = (p.xyz - center).normalize_or_zero();
        *p = SupportPoint::new(p.pt_a + dir * bias, p.pt_b - dir * bias);
    }

    Some(epa_expand(body_a, body_b, bias, &simplex))
}

/// Boolean form of [`gjk_intersection`].
pub fn gjk_intersects(body_a: &Body, body_b: &Body) -> bool {
    gjk_intersection(body_a, body_b, 0.0).is_some()
}

/// Closest points between two separated bodies, as `(on_a, on_b)`.
pub fn gjk_closest_points(body_a: &Body, body_b: &Body) -> (Vec3, Vec3) {
    let mut simplex = Vec::with_capacity(4);
    simplex.push(support(body_a, body_b, Vec3::X, 0.0));

    let mut lambdas = Vec4::X;
    let mut closest_dist = f32::MAX;
    let mut new_dir = -simplex[0].xyz;

    for _ in 0..GJK_MAX_ITERATIONS {
        let new_pt = support(body_a, body_b, new_dir, 0.0);
        if has_point(&simplex, &new_pt) {
            break;
        }
        simplex.push(new_pt);

        let (_, dir, mut new_lambdas) = simplex_signed_volumes(&simplex);
        sort_valids(&mut simplex, &mut new_lambdas);
        lambdas = new_lambdas;
        new_dir = dir;

        let dist = dir.length_squared();
        if dist >= closest_dist || simplex.len() == 4 {
            break;
        }
        closest_dist = dist;
    }

    let mut on_a = Vec3::ZERO;
    let mut on_b = Vec3::ZERO;
    for (i, p) in simplex.iter().enumerate() {
        on_a += p.pt_a * lambdas[i];
        on_b += p.pt_b * lambdas[i];
    }
    (on_a, on_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::Shape;
    use glam::DVec3;

    fn sphere_at(radius: f32, x: f64, y: f64) -> Body {
        Body::new_dynamic(Shape::sphere(radius).unwrap(), 1.0, DVec3::new(x, y, 0.0))
    }

    fn unit_box_at(x: f64) -> Body {
        let shape = Shape::from_half_extents(Vec3::splat(0.5)).unwrap();
        Body::new_dynamic(shape, 1.0, DVec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_sort_valids_compacts() {
        let mut simplex = vec![
            SupportPoint::new(Vec3::X, Vec3::ZERO),
            SupportPoint::new(Vec3::Y, Vec3::ZERO),
            SupportPoint::new(Vec3::Z, Vec3::ZERO),
        ];
        let mut lambdas = Vec4::new(0.5, 0.0, 0.5, 0.0);
        sort_valids(&mut simplex, &mut lambdas);
        assert_eq!(simplex.len(), 2);
        assert_eq!(simplex[1].xyz, Vec3::Z);
        assert_eq!(lambdas, Vec4::new(0.5, 0.5, 0.0, 0.0));
        assert_eq!(num_valids(lambdas), 2);
    }

    #[test]
    fn test_signed_volumes_segment_through_origin() {
        let simplex = [
            SupportPoint::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO),
            SupportPoint::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        let (inside, _, lambdas) = simplex_signed_volumes(&simplex);
        assert!(inside);
        assert!((lambdas.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_spheres_agree_with_closed_form() {
        let cases = [(0.0, 1.0), (1.5, 0.5), (1.9, 0.0), (2.1, 0.0), (3.0, 1.0), (0.3, 0.2)];
        for (x, y) in cases {
            let a = sphere_at(1.0, 0.0, 0.0);
            let b = sphere_at(1.0, x, y);
            let d = (x * x + y * y).sqrt();
            assert_eq!(gjk_intersects(&a, &b), d < 2.0, "distance {d}");
        }
    }

    #[test]
    fn test_separated_result_is_stable() {
        let a = unit_box_at(0.0);
        let b = unit_box_at(3.0);
        for _ in 0..10 {
            assert!(gjk_intersection(&a, &b, 0.0).is_none());
        }
    }

    #[test]
    fn test_box_overlap_depth() {
        let a = unit_box_at(0.0);
        let b = unit_box_at(0.9);
        let pen = gjk_intersection(&a, &b, 0.0).expect("boxes overlap");
        assert!((pen.depth - 0.1).abs() < 1e-3, "depth {}", pen.depth);
        assert!((pen.normal.x.abs() - 1.0).abs() < 1e-3);
        assert!(pen.normal.x > 0.0);
    }

    #[test]
    fn test_box_closest_points() {
        let a = unit_box_at(0.0);
        let b = unit_box_at(2.0);
        assert!(!gjk_intersects(&a, &b));
        let (on_a, on_b) = gjk_closest_points(&a, &b);
        let eps = 1e-4;
        assert!((on_a.x - 0.5).abs() < eps);
        assert!((on_b.x - 1.5).abs() < eps);
    }

    #[test]
    fn test_sphere_closest_points() {
        let a = sphere_at(1.0, 0.0, 0.0);
        let b = sphere_at(0.5, 0.0, 4.0);
        let (on_a, on_b) = gjk_closest_points(&a, &b);
        assert!((on_a - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-3);
        assert!((on_b - Vec3::new(0.0, 3.5, 0.0)).length() < 1e-3);
    }
}
