//! Narrowphase collision detection: GJK, EPA, and specialized tests.
//!
//! Sphere pairs are handled analytically, including a swept test over the
//! step. Every other pair goes through conservative advancement driven by
//! the static test, which uses GJK/EPA when the bodies overlap and GJK
//! closest points when they do not.

pub mod epa;
pub mod gjk;
pub mod projection;
pub mod support;

use glam::{DVec3, Quat, Vec3};

use super::contact::{Contact, IntersectionPoint};
use super::rigid_body::Body;

use self::gjk::{gjk_closest_points, gjk_intersection};

/// Inflation applied to both shapes before EPA.
pub const EPA_BIAS: f32 = 0.001;

/// Maximum number of conservative advancement steps per pair.
const MAX_ADVANCE_STEPS: usize = 10;

/// Closest-point gap below which the direction between the witness points
/// is too noisy to use as a normal.
const NORMAL_EPSILON: f32 = 1e-4;

/// Gap at which advancing bodies are treated as touching.
const TOUCH_DISTANCE: f32 = EPA_BIAS;

/// Outcome of a static narrow-phase test. Both variants carry the contact
/// geometry; a disjoint contact holds the closest points and a positive
/// separation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proximity {
    Intersecting(Contact),
    Disjoint(Contact),
}

impl Proximity {
    pub fn is_intersecting(&self) -> bool {
        matches!(self, Proximity::Intersecting(_))
    }

    pub fn contact(&self) -> &Contact {
        match self {
            Proximity::Intersecting(c) | Proximity::Disjoint(c) => c,
        }
    }

    pub fn into_contact(self) -> Contact {
        match self {
            Proximity::Intersecting(c) | Proximity::Disjoint(c) => c,
        }
    }
}

/// Swept sphere contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub time_of_impact: f32,
}

/// Intersect the ray `origin + t * dir` with a sphere. Returns the entry
/// and exit parameters, in units of `dir`.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<(f32, f32)> {
    let m = center - origin;
    let a = dir.dot(dir);
    let b = m.dot(dir);
    let c = m.dot(m) - radius * radius;

    let discriminant = b * b - a * c;
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }
    let inv_a = 1.0 / a;
    let root = discriminant.sqrt();
    Some((inv_a * (b - root), inv_a * (b + root)))
}

/// Overlap test for two spheres at rest. Returns the surface points facing
/// each other when they touch or overlap.
pub fn sphere_to_sphere_static(
    radius_a: f32,
    radius_b: f32,
    pos_a: Vec3,
    pos_b: Vec3,
) -> Option<(Vec3, Vec3)> {
    let ab = pos_b - pos_a;
    let radius_ab = radius_a + radius_b;
    if ab.length_squared() > radius_ab * radius_ab {
        return None;
    }
    let n = ab.try_normalize().unwrap_or(Vec3::X);
    Some((pos_a + n * radius_a, pos_b - n * radius_b))
}

/// Swept test for two moving spheres over `dt` seconds.
#[allow(clippy::too_many_arguments)]
pub fn sphere_to_sphere_dynamic(
    radius_a: f32,
    radius_b: f32,
    pos_a: Vec3,
    pos_b: Vec3,
    vel_a: Vec3,
    vel_b: Vec3,
    dt: f32,
) -> Option<SweepHit> {
    let ray_dir = (vel_a - vel_b) * dt;
    let radius = radius_a + radius_b;

    let (t0, t1) = if ray_dir.length_squared() < 1e-8 {
        let slack = radius + 0.001;
        if pos_a.distance_squared(pos_b) > slack * slack {
            return None;
        }
        (0.0, 0.0)
    } else {
        ray_sphere(pos_a, ray_dir, pos_b, radius)?
    };

    let (t0, t1) = (t0 * dt, t1 * dt);
    if t1 < 0.0 {
        return None;
    }
    let toi = t0.max(0.0);
    if toi > dt {
        return None;
    }

    let new_a = pos_a + vel_a * toi;
    let new_b = pos_b + vel_b * toi;
    let n = (new_b - new_a).try_normalize().unwrap_or(Vec3::X);
    Some(SweepHit {
        point_a: new_a + n * radius_a,
        point_b: new_b - n * radius_b,
        time_of_impact: toi,
    })
}

fn contact_between(body_a: &Body, body_b: &Body, a: usize, b: usize, pt_a: Vec3, pt_b: Vec3) -> Contact {
    let mut contact = Contact::new(a, b);
    contact.point_a = IntersectionPoint {
        world: pt_a,
        model: body_a.world_to_model(pt_a),
    };
    contact.point_b = IntersectionPoint {
        world: pt_b,
        model: body_b.world_to_model(pt_b),
    };
    contact
}

/// Unit direction from A's center of mass to B's, or +Y if they coincide.
fn center_direction(body_a: &Body, body_b: &Body) -> Vec3 {
    (body_b.center_of_mass_world_space() - body_a.center_of_mass_world_space())
        .try_normalize()
        .unwrap_or(Vec3::Y)
}

/// Test bodies `a` and `b` at their current poses.
pub fn intersects_static(bodies: &[Body], a: usize, b: usize) -> Proximity {
    let (body_a, body_b) = (&bodies[a], &bodies[b]);

    if let (Some(ra), Some(rb)) = (body_a.shape.radius(), body_b.shape.radius()) {
        let (pos_a, pos_b) = (body_a.position_f32(), body_b.position_f32());
        let separation = pos_a.distance(pos_b) - (ra + rb);
        let n = (pos_b - pos_a).try_normalize().unwrap_or(Vec3::X);
        let (pt_a, pt_b, hit) = match sphere_to_sphere_static(ra, rb, pos_a, pos_b) {
            Some((pt_a, pt_b)) => (pt_a, pt_b, true),
            None => (pos_a + n * ra, pos_b - n * rb, false),
        };

        let mut contact = contact_between(body_a, body_b, a, b, pt_a, pt_b);
        contact.normal = n;
        contact.separation_distance = separation;
        return if hit {
            Proximity::Intersecting(contact)
        } else {
            Proximity::Disjoint(contact)
        };
    }

    if let Some(pen) = gjk_intersection(body_a, body_b, EPA_BIAS) {
        // Strip the inflation back off the witness points.
        let normal = pen.normal;
        let pt_a = pen.point_a - normal * EPA_BIAS;
        let pt_b = pen.point_b + normal * EPA_BIAS;

        let mut contact = contact_between(body_a, body_b, a, b, pt_a, pt_b);
        contact.normal = normal;
        contact.separation_distance = -(pen.depth - 2.0 * EPA_BIAS);
        return Proximity::Intersecting(contact);
    }

    let (pt_a, pt_b) = gjk_closest_points(body_a, body_b);
    let mut contact = contact_between(body_a, body_b, a, b, pt_a, pt_b);
    let ab = pt_b - pt_a;
    let distance = ab.length();
    contact.normal = if distance > NORMAL_EPSILON {
        ab / distance
    } else {
        center_direction(body_a, body_b)
    };
    contact.separation_distance = distance;
    Proximity::Disjoint(contact)
}

/// Pose captured before a look-ahead so that it can be undone exactly.
#[derive(Clone, Copy)]
struct Pose {
    position: DVec3,
    orientation: Quat,
    angular_velocity: Vec3,
}

impl Pose {
    fn of(body: &Body) -> Self {
        Self {
            position: body.position,
            orientation: body.orientation,
            angular_velocity: body.angular_velocity,
        }
    }

    fn restore(self, body: &mut Body) {
        body.position = self.position;
        body.orientation = self.orientation;
        body.angular_velocity = self.angular_velocity;
    }
}

/// Fastest approach speed of `body`'s surface along the world direction
/// `dir` due to its spin.
fn spin_speed(body: &Body, dir: Vec3) -> f32 {
    let to_body = body.orientation.inverse();
    body.shape
        .fastest_linear_speed(to_body * body.angular_velocity, to_body * dir)
}

/// Step both bodies forward by safe amounts until they touch or `dt` runs
/// out. The bodies are left at their starting poses.
pub fn conservative_advance(bodies: &mut [Body], a: usize, b: usize, dt: f32) -> Option<Contact> {
    let start_a = Pose::of(&bodies[a]);
    let start_b = Pose::of(&bodies[b]);

    let mut remaining = dt;
    let mut toi = 0.0;
    let mut steps = 0;
    let mut result = None;

    while remaining > 0.0 {
        let contact = match intersects_static(bodies, a, b) {
            Proximity::Intersecting(mut contact) => {
                contact.time_of_impact = toi;
                result = Some(contact);
                break;
            }
            Proximity::Disjoint(mut contact) if contact.separation_distance <= TOUCH_DISTANCE => {
                contact.time_of_impact = toi;
                result = Some(contact);
                break;
            }
            Proximity::Disjoint(contact) => contact,
        };

        if steps == MAX_ADVANCE_STEPS {
            break;
        }
        steps += 1;

        let ab = contact.normal;
        let relative = bodies[a].linear_velocity - bodies[b].linear_velocity;
        let ortho_speed =
            relative.dot(ab) + spin_speed(&bodies[a], ab) + spin_speed(&bodies[b], -ab);
        if ortho_speed <= 0.0 {
            break;
        }

        let time_to_go = contact.separation_distance / ortho_speed;
        if time_to_go > remaining {
            break;
        }

        remaining -= time_to_go;
        toi += time_to_go;
        bodies[a].update(time_to_go);
        bodies[b].update(time_to_go);
    }

    start_a.restore(&mut bodies[a]);
    start_b.restore(&mut bodies[b]);
    result
}

/// Test bodies `a` and `b` over a step of `dt` seconds.
///
/// Returns the contact at the earliest time the bodies touch within the
/// step, or `None` if they stay apart.
pub fn intersects(bodies: &mut [Body], a: usize, b: usize, dt: f32) -> Option<Contact> {
    debug_assert_ne!(a, b, "a body cannot collide with itself");

    let (body_a, body_b) = (&bodies[a], &bodies[b]);
    let (ra, rb) = match (body_a.shape.radius(), body_b.shape.radius()) {
        (Some(ra), Some(rb)) => (ra, rb),
        _ => return conservative_advance(bodies, a, b, dt),
    };

    let hit = sphere_to_sphere_dynamic(
        ra,
        rb,
        body_a.position_f32(),
        body_b.position_f32(),
        body_a.linear_velocity,
        body_b.linear_velocity,
        dt,
    )?;

    // Express the witness points in the bodies' frames at impact time.
    let start_a = Pose::of(&bodies[a]);
    let start_b = Pose::of(&bodies[b]);
    bodies[a].update(hit.time_of_impact);
    bodies[b].update(hit.time_of_impact);

    let (body_a, body_b) = (&bodies[a], &bodies[b]);
    let mut contact = contact_between(body_a, body_b, a, b, hit.point_a, hit.point_b);
    contact.time_of_impact = hit.time_of_impact;
    contact.normal = (body_b.position_f32() - body_a.position_f32())
        .try_normalize()
        .unwrap_or(Vec3::X);
    contact.separation_distance = body_a.position_f32().distance(body_b.position_f32()) - (ra + rb);

    start_a.restore(&mut bodies[a]);
    start_b.restore(&mut bodies[b]);
    Some(contact)
}
