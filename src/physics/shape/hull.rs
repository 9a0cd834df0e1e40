//! Incremental convex hull construction and exact mass properties of the
//! resulting triangle hull.

use glam::{Mat3, Vec3};

use crate::error::ShapeError;

/// Triangle of a closed hull, stored as indices into a point array.
///
/// Winding is counter-clockwise when seen from outside, so the normal
/// `(b - a) x (c - a)` points away from the hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    /// The three directed edges `(a, b)`, `(b, c)`, `(c, a)`.
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.c, self.a),
        ]
    }

    /// Unit normal, or zero for a degenerate triangle.
    pub fn normal(&self, points: &[Vec3]) -> Vec3 {
        let (a, b, c) = (points[self.a], points[self.b], points[self.c]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Signed distance of `pt` from the triangle's plane, positive in front.
    pub fn signed_distance(&self, points: &[Vec3], pt: Vec3) -> f32 {
        self.normal(points).dot(pt - points[self.a])
    }

    /// True if any vertex index equals `idx`.
    pub fn references(&self, idx: usize) -> bool {
        self.a == idx || self.b == idx || self.c == idx
    }
}

/// Edge between two vertex indices. Equality ignores direction.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

/// Edges used by exactly one triangle of `triangles`, keeping the
/// direction they have in that triangle.
pub fn find_dangling_edges(triangles: &[Triangle]) -> Vec<Edge> {
    let mut dangling = Vec::new();
    for (i, tri) in triangles.iter().enumerate() {
        for edge in tri.edges() {
            let shared = triangles
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.edges().contains(&edge));
            if !shared {
                dangling.push(edge);
            }
        }
    }
    dangling
}

/// Index of the point with the largest projection onto `dir`.
pub fn furthest_in_dir(points: &[Vec3], dir: Vec3) -> usize {
    let mut best = 0;
    let mut best_dot = f32::MIN;
    for (i, p) in points.iter().enumerate() {
        let d = p.dot(dir);
        if d > best_dot {
            best_dot = d;
            best = i;
        }
    }
    best
}

fn distance_from_line(a: Vec3, b: Vec3, pt: Vec3) -> f32 {
    let ab = (b - a).normalize_or_zero();
    let ap = pt - a;
    (ap - ab * ap.dot(ab)).length()
}

fn distance_from_plane(a: Vec3, b: Vec3, c: Vec3, pt: Vec3) -> f32 {
    let n = (b - a).cross(c - a).normalize_or_zero();
    n.dot(pt - a)
}

/// Hull tolerance scaled to the extent of the cloud.
fn hull_tolerance(points: &[Vec3]) -> f32 {
    let mut lo = Vec3::splat(f32::MAX);
    let mut hi = Vec3::splat(f32::MIN);
    for p in points {
        lo = lo.min(*p);
        hi = hi.max(*p);
    }
    ((hi - lo).max_element() * 1e-5).max(1e-6)
}

fn build_tetrahedron(points: &[Vec3], tol: f32) -> Result<(Vec<Vec3>, Vec<Triangle>), ShapeError> {
    let p0 = points[furthest_in_dir(points, Vec3::X)];

    let mut p1 = p0;
    let mut best = 0.0;
    for p in points {
        let d = p.distance_squared(p0);
        if d > best {
            best = d;
            p1 = *p;
        }
    }
    if best.sqrt() <= tol {
        return Err(ShapeError::DegenerateHull);
    }

    let mut p2 = p0;
    let mut best = 0.0;
    for p in points {
        let d = distance_from_line(p0, p1, *p);
        if d > best {
            best = d;
            p2 = *p;
        }
    }
    if best <= tol {
        return Err(ShapeError::DegenerateHull);
    }

    let mut p3 = p0;
    let mut best = 0.0f32;
    for p in points {
        let d = distance_from_plane(p0, p1, p2, *p);
        if d.abs() > best.abs() {
            best = d;
            p3 = *p;
        }
    }
    if best.abs() <= tol {
        return Err(ShapeError::DegenerateHull);
    }

    // The fourth point must sit behind the first face.
    let (p0, p1) = if best > 0.0 { (p1, p0) } else { (p0, p1) };

    let hull_points = vec![p0, p1, p2, p3];
    let triangles = vec![
        Triangle::new(0, 1, 2),
        Triangle::new(0, 2, 3),
        Triangle::new(2, 1, 3),
        Triangle::new(1, 0, 3),
    ];
    Ok((hull_points, triangles))
}

/// Drop every candidate that lies inside the current hull or on top of one
/// of its vertices.
fn remove_internal_points(
    hull_points: &[Vec3],
    triangles: &[Triangle],
    candidates: &mut Vec<Vec3>,
    tol: f32,
) {
    candidates.retain(|pt| {
        let outside = triangles
            .iter()
            .any(|tri| tri.signed_distance(hull_points, *pt) > tol);
        let duplicate = hull_points.iter().any(|h| h.distance(*pt) <= tol);
        outside && !duplicate
    });
}

fn add_point(hull_points: &mut Vec<Vec3>, triangles: &mut Vec<Triangle>, pt: Vec3, tol: f32) {
    let (facing, kept): (Vec<Triangle>, Vec<Triangle>) = triangles
        .iter()
        .partition(|tri| tri.signed_distance(hull_points, pt) > tol);
    if facing.is_empty() {
        return;
    }

    let horizon = find_dangling_edges(&facing);
    *triangles = kept;

    let new_idx = hull_points.len();
    hull_points.push(pt);
    triangles.extend(horizon.iter().map(|e| Triangle::new(e.a, e.b, new_idx)));
}

fn remove_unreferenced(hull_points: &mut Vec<Vec3>, triangles: &mut [Triangle]) {
    let mut remap = vec![usize::MAX; hull_points.len()];
    let mut kept = Vec::with_capacity(hull_points.len());
    for tri in triangles.iter() {
        for idx in [tri.a, tri.b, tri.c] {
            if remap[idx] == usize::MAX {
                remap[idx] = kept.len();
                kept.push(hull_points[idx]);
            }
        }
    }
    for tri in triangles.iter_mut() {
        tri.a = remap[tri.a];
        tri.b = remap[tri.b];
        tri.c = remap[tri.c];
    }
    *hull_points = kept;
}

/// Build the convex hull of a point cloud.
///
/// Returns the hull vertices (interior points removed) and outward-wound
/// triangles indexing into them.
pub fn build_convex_hull(points: &[Vec3]) -> Result<(Vec<Vec3>, Vec<Triangle>), ShapeError> {
    if points.is_empty() {
        return Err(ShapeError::NoVertices);
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(ShapeError::NonFiniteVertex(i));
    }
    if points.len() < 4 {
        return Err(ShapeError::TooFewPoints(points.len()));
    }

    let tol = hull_tolerance(points);
    let (mut hull_points, mut triangles) = build_tetrahedron(points, tol)?;

    let mut external = points.to_vec();
    remove_internal_points(&hull_points, &triangles, &mut external, tol);

    while let Some(&seed) = external.first() {
        let idx = furthest_in_dir(&external, seed);
        let pt = external.swap_remove(idx);
        add_point(&mut hull_points, &mut triangles, pt, tol);
        remove_internal_points(&hull_points, &triangles, &mut external, tol);
    }

    remove_unreferenced(&mut hull_points, &mut triangles);
    Ok((hull_points, triangles))
}

/// Volume, center of mass and unit-mass inertia tensor of a solid hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub volume: f32,
    pub center_of_mass: Vec3,
    /// Inertia of a unit mass about `center_of_mass`.
    pub inertia_tensor: Mat3,
}

fn tetrahedron_signed_volume(p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> f32 {
    (p2 - p1).dot((p3 - p1).cross(p4 - p1)) / 6.0
}

/// Inertia tensor of a unit-density tetrahedron about `point`, scaled by
/// its volume afterwards by the caller.
fn tetrahedron_unit_inertia_tensor_wrt_point(
    point: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    p4: Vec3,
) -> Mat3 {
    let p1 = p1 - point;
    let p2 = p2 - point;
    let p3 = p3 - point;
    let p4 = p4 - point;

    let (x1, y1, z1) = (p1.x, p1.y, p1.z);
    let (x2, y2, z2) = (p2.x, p2.y, p2.z);
    let (x3, y3, z3) = (p3.x, p3.y, p3.z);
    let (x4, y4, z4) = (p4.x, p4.y, p4.z);

    let diag_x = x1 * x1
        + x1 * x2
        + x2 * x2
        + x1 * x3
        + x2 * x3
        + x3 * x3
        + x1 * x4
        + x2 * x4
        + x3 * x4
        + x4 * x4;
    let diag_y = y1 * y1
        + y1 * y2
        + y2 * y2
        + y1 * y3
        + y2 * y3
        + y3 * y3
        + y1 * y4
        + y2 * y4
        + y3 * y4
        + y4 * y4;
    let diag_z = z1 * z1
        + z1 * z2
        + z2 * z2
        + z1 * z3
        + z2 * z3
        + z3 * z3
        + z1 * z4
        + z2 * z4
        + z3 * z4
        + z4 * z4;

    let ixx = (diag_y + diag_z) * 0.1;
    let iyy = (diag_z + diag_x) * 0.1;
    let izz = (diag_x + diag_y) * 0.1;

    // Products of inertia.
    let yz = (y1 * z1 * 2.0
        + y2 * z1
        + y3 * z1
        + y4 * z1
        + y1 * z2
        + y2 * z2 * 2.0
        + y3 * z2
        + y4 * z2
        + y1 * z3
        + y2 * z3
        + y3 * z3 * 2.0
        + y4 * z3
        + y1 * z4
        + y2 * z4
        + y3 * z4
        + y4 * z4 * 2.0)
        * 0.05;
    let xz = (x1 * z1 * 2.0
        + x2 * z1
        + x3 * z1
        + x4 * z1
        + x1 * z2
        + x2 * z2 * 2.0
        + x3 * z2
        + x4 * z2
        + x1 * z3
        + x2 * z3
        + x3 * z3 * 2.0
        + x4 * z3
        + x1 * z4
        + x2 * z4
        + x3 * z4
        + x4 * z4 * 2.0)
        * 0.05;
    let xy = (x1 * y1 * 2.0
        + x2 * y1
        + x3 * y1
        + x4 * y1
        + x1 * y2
        + x2 * y2 * 2.0
        + x3 * y2
        + x4 * y2
        + x1 * y3
        + x2 * y3
        + x3 * y3 * 2.0
        + x4 * y3
        + x1 * y4
        + x2 * y4
        + x3 * y4
        + x4 * y4 * 2.0)
        * 0.05;

    Mat3::from_cols(
        Vec3::new(ixx, -xy, -xz),
        Vec3::new(-xy, iyy, -yz),
        Vec3::new(-xz, -yz, izz),
    )
}

/// Integrate volume, center of mass and inertia over a closed,
/// outward-wound triangle hull.
pub fn hull_mass_properties(points: &[Vec3], triangles: &[Triangle]) -> MassProperties {
    let reference = points.iter().copied().sum::<Vec3>() / points.len().max(1) as f32;

    let mut volume = 0.0;
    let mut weighted = Vec3::ZERO;
    for tri in triangles {
        let (a, b, c) = (points[tri.a], points[tri.b], points[tri.c]);
        let vol = tetrahedron_signed_volume(reference, a, b, c);
        weighted += (reference + a + b + c) * 0.25 * vol;
        volume += vol;
    }

    if volume.abs() < f32::EPSILON {
        return MassProperties {
            volume: 0.0,
            center_of_mass: reference,
            inertia_tensor: Mat3::ZERO,
        };
    }

    let com = weighted / volume;
    let mut itot = Mat3::ZERO;
    for tri in triangles {
        let (a, b, c) = (points[tri.a], points[tri.b], points[tri.c]);
        let vol = tetrahedron_signed_volume(com, a, b, c);
        itot += tetrahedron_unit_inertia_tensor_wrt_point(com, com, a, b, c) * vol;
    }

    MassProperties {
        volume,
        center_of_mass: com,
        inertia_tensor: itot * (1.0 / volume),
    }
}
