//! Single-pass impulse contact resolution.

use glam::{Mat3, Vec3};

use super::contact::Contact;
use super::rigid_body::Body;

/// Fraction of the penetration removed per contact.
const CORRECTION_PERCENT: f32 = 0.05;
/// Penetration slop (allowed penetration before position correction).
const PENETRATION_SLOP: f32 = 0.01;

/// Velocity of the material point at offset `r` from the center of mass.
fn point_velocity(body: &Body, r: Vec3) -> Vec3 {
    body.linear_velocity + body.angular_velocity.cross(r)
}

/// Inverse effective mass of the pair along `dir`.
fn inverse_mass_along(
    inv_mass_sum: f32,
    inv_inertia_a: Mat3,
    inv_inertia_b: Mat3,
    r_a: Vec3,
    r_b: Vec3,
    dir: Vec3,
) -> f32 {
    let r_a_cross = r_a.cross(dir);
    let r_b_cross = r_b.cross(dir);
    inv_mass_sum
        + (inv_inertia_a * r_a_cross).dot(r_a_cross)
        + (inv_inertia_b * r_b_cross).dot(r_b_cross)
}

/// Resolve one contact between two bodies of the arena.
///
/// Applies a restitution impulse along the normal when the bodies approach,
/// a Coulomb-clamped friction impulse along the sliding direction, and
/// pushes penetrating bodies apart in proportion to their inverse masses.
pub fn resolve_contact(bodies: &mut [Body], contact: &Contact) {
    let (a, b) = (contact.body_a, contact.body_b);
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return;
    }
    if !contact.is_finite() {
        tracing::warn!(body_a = a, body_b = b, "ignoring non-finite contact");
        return;
    }

    let inv_mass_a = bodies[a].inv_mass;
    let inv_mass_b = bodies[b].inv_mass;
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum == 0.0 {
        return;
    }

    // Contact points follow the bodies from the pose they were found at.
    let normal = contact.normal;
    let pt_a = bodies[a].model_to_world(contact.point_a.model);
    let pt_b = bodies[b].model_to_world(contact.point_b.model);

    let inv_inertia_a = bodies[a].inverse_inertia_tensor_world_space();
    let inv_inertia_b = bodies[b].inverse_inertia_tensor_world_space();
    let r_a = pt_a - bodies[a].center_of_mass_world_space();
    let r_b = pt_b - bodies[b].center_of_mass_world_space();

    let rel_vel = point_velocity(&bodies[b], r_b) - point_velocity(&bodies[a], r_a);
    let contact_velocity = rel_vel.dot(normal);

    // Only resolve if the bodies are approaching
    if contact_velocity < 0.0 {
        let restitution = bodies[a].elasticity * bodies[b].elasticity;
        let friction = (bodies[a].friction * bodies[b].friction).sqrt();

        let k_normal =
            inverse_mass_along(inv_mass_sum, inv_inertia_a, inv_inertia_b, r_a, r_b, normal);
        let j_normal = -(1.0 + restitution) * contact_velocity / k_normal;

        let impulse = normal * j_normal;
        bodies[a].apply_impulse(pt_a, -impulse);
        bodies[b].apply_impulse(pt_b, impulse);

        // Friction impulse
        // Re-read velocities after normal impulse
        let rel_vel = point_velocity(&bodies[b], r_b) - point_velocity(&bodies[a], r_a);
        let tangent_vel = rel_vel - normal * rel_vel.dot(normal);
        let tangent_len = tangent_vel.length();

        if tangent_len > 1e-6 {
            let tangent = tangent_vel / tangent_len;
            let k_tangent =
                inverse_mass_along(inv_mass_sum, inv_inertia_a, inv_inertia_b, r_a, r_b, tangent);

            if k_tangent > 0.0 {
                // Coulomb friction: |Jt| <= mu * |Jn|
                let j_tangent = (tangent_len / k_tangent).min(friction * j_normal);
                let friction_impulse = tangent * j_tangent;
                bodies[a].apply_impulse(pt_a, friction_impulse);
                bodies[b].apply_impulse(pt_b, -friction_impulse);
            }
        }
    }

    let penetration = -contact.separation_distance;
    if penetration > PENETRATION_SLOP {
        let correction = (penetration - PENETRATION_SLOP) * CORRECTION_PERCENT / inv_mass_sum;
        bodies[a].position -= (normal * correction * inv_mass_a).as_dvec3();
        bodies[b].position += (normal * correction * inv_mass_b).as_dvec3();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::contact::IntersectionPoint;
    use crate::physics::narrowphase::intersects;
    use crate::physics::shape::Shape;
    use glam::DVec3;

    fn ball(pos: DVec3, vel: Vec3) -> Body {
        Body::new_dynamic(Shape::sphere(0.5).unwrap(), 1.0, pos).with_velocity(vel)
    }

    fn head_on_contact(bodies: &[Body], pt: Vec3, separation: f32) -> Contact {
        let mut contact = Contact::new(0, 1);
        contact.point_a = IntersectionPoint { world: pt, model: bodies[0].world_to_model(pt) };
        contact.point_b = IntersectionPoint { world: pt, model: bodies[1].world_to_model(pt) };
        contact.normal = Vec3::X;
        contact.separation_distance = separation;
        contact
    }

    fn normal_velocity(bodies: &[Body], contact: &Contact) -> f32 {
        let (a, b) = (&bodies[contact.body_a], &bodies[contact.body_b]);
        let r_a = a.model_to_world(contact.point_a.model) - a.center_of_mass_world_space();
        let r_b = b.model_to_world(contact.point_b.model) - b.center_of_mass_world_space();
        (point_velocity(b, r_b) - point_velocity(a, r_a)).dot(contact.normal)
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let mut bodies = vec![
            ball(DVec3::ZERO, Vec3::new(2.0, 0.0, 0.0)).with_elasticity(1.0),
            ball(DVec3::new(1.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)).with_elasticity(1.0),
        ];
        let contact = head_on_contact(&bodies, Vec3::new(0.5, 0.0, 0.0), 0.0);
        resolve_contact(&mut bodies, &contact);

        let eps = 1e-4;
        assert!((bodies[0].linear_velocity.x + 2.0).abs() < eps);
        assert!((bodies[1].linear_velocity.x - 2.0).abs() < eps);
    }

    #[test]
    fn test_inelastic_stops_approach() {
        let mut bodies = vec![
            ball(DVec3::ZERO, Vec3::new(3.0, 0.5, 0.0))
                .with_elasticity(0.0)
                .with_friction(0.0),
            ball(DVec3::new(0.9, 0.3, 0.0), Vec3::new(-1.0, 0.0, 0.2))
                .with_elasticity(0.0)
                .with_friction(0.0),
        ];
        // Off-center so angular terms contribute.
        let contact = head_on_contact(&bodies, Vec3::new(0.45, 0.2, 0.1), -0.1);
        assert!(normal_velocity(&bodies, &contact) < 0.0);
        resolve_contact(&mut bodies, &contact);
        assert!(
            normal_velocity(&bodies, &contact) >= -1e-4,
            "still approaching: {}",
            normal_velocity(&bodies, &contact)
        );
    }

    #[test]
    fn test_separating_bodies_untouched() {
        let mut bodies = vec![
            ball(DVec3::ZERO, Vec3::new(-1.0, 0.0, 0.0)),
            ball(DVec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        ];
        let contact = head_on_contact(&bodies, Vec3::new(0.5, 0.0, 0.0), 0.0);
        resolve_contact(&mut bodies, &contact);
        assert_eq!(bodies[0].linear_velocity, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bodies[1].linear_velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_static_body_does_not_move() {
        let ground = Body::new_static(Shape::sphere(0.5).unwrap(), DVec3::new(1.0, 0.0, 0.0));
        let mut bodies = vec![ball(DVec3::ZERO, Vec3::new(1.0, 0.0, 0.0)), ground];
        let contact = head_on_contact(&bodies, Vec3::new(0.5, 0.0, 0.0), -0.5);
        resolve_contact(&mut bodies, &contact);

        assert_eq!(bodies[1].position, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(bodies[1].linear_velocity, Vec3::ZERO);
        assert!(bodies[0].linear_velocity.x <= 0.0);
        // Pushed back by (0.5 - 0.01) * 0.05.
        assert!((bodies[0].position.x + 0.0245).abs() < 1e-5);
    }

    #[test]
    fn test_friction_is_bounded() {
        let ground = Body::new_static(Shape::from_half_extents(Vec3::splat(0.5)).unwrap(), DVec3::ZERO)
            .with_friction(1.0);
        let slider = ball(DVec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, -1.0, 0.0))
            .with_friction(1.0)
            .with_elasticity(0.0);
        let mut bodies = vec![ground, slider];
        let mut contact = head_on_contact(&bodies, Vec3::new(0.0, 0.5, 0.0), 0.0);
        contact.normal = Vec3::Y;
        resolve_contact(&mut bodies, &contact);

        // Normal impulse is 1, so at most 1 unit of tangential speed is removed
        // from the center of mass.
        let vx = bodies[1].linear_velocity.x;
        assert!(vx >= 9.0 - 1e-4 && vx < 10.0, "vx = {vx}");
        assert!(bodies[1].linear_velocity.y.abs() < 1e-4);
    }

    fn box_and_wall() -> Vec<Body> {
        let cube = Shape::from_half_extents(Vec3::splat(0.5)).unwrap();
        let slab = Shape::from_half_extents(Vec3::new(0.05, 2.0, 2.0)).unwrap();
        vec![
            Body::new_dynamic(cube, 1.0, DVec3::ZERO)
                .with_velocity(Vec3::new(120.0, 0.0, 0.0))
                .with_elasticity(0.0)
                .with_friction(0.0),
            Body::new_static(slab, DVec3::new(1.5, 0.0, 0.0)),
        ]
    }

    fn assert_future_contact_stops_approach(a: usize, b: usize) {
        let mut bodies = box_and_wall();
        let contact = intersects(&mut bodies, a, b, 1.0 / 60.0).expect("wall is reached this step");
        assert!(contact.time_of_impact > 0.0, "toi = {}", contact.time_of_impact);
        assert!(normal_velocity(&bodies, &contact) < 0.0);

        // Resolved before the box has travelled to the wall.
        resolve_contact(&mut bodies, &contact);
        let closing = normal_velocity(&bodies, &contact);
        assert!(closing >= -1e-3, "still approaching: {}", closing);
        assert!(bodies[0].linear_velocity.x < 1.0, "vx = {}", bodies[0].linear_velocity.x);
    }

    #[test]
    fn test_future_contact_stops_approach() {
        assert_future_contact_stops_approach(0, 1);
    }

    #[test]
    fn test_future_contact_stops_approach_swapped() {
        assert_future_contact_stops_approach(1, 0);
    }

    #[test]
    fn test_non_finite_contact_ignored() {
        let mut bodies = vec![
            ball(DVec3::ZERO, Vec3::new(1.0, 0.0, 0.0)),
            ball(DVec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        let mut contact = head_on_contact(&bodies, Vec3::new(0.5, 0.0, 0.0), -0.1);
        contact.normal = Vec3::new(f32::NAN, 0.0, 0.0);
        resolve_contact(&mut bodies, &contact);
        assert_eq!(bodies[0].linear_velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bodies[0].position, DVec3::ZERO);
    }
}
