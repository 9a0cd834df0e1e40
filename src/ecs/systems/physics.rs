//! ECS physics system.
//!
//! Gathers rigid bodies from the World, steps them and writes the results
//! back into their components.

use crate::ecs::components::physics::RigidBody;
use crate::ecs::components::transform::Transform;
use crate::physics::rigid_body::Body;
use crate::physics::PhysicsWorld;

/// Step every entity with a `Transform` and a `RigidBody` by `delta_time`
/// seconds. Returns the number of fixed steps that ran.
pub fn physics_system(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    delta_time: f64,
) -> usize {
    let mut entities = Vec::new();
    let mut bodies: Vec<Body> = Vec::new();
    for (entity, (transform, rb)) in world.query::<(&Transform, &RigidBody)>().iter() {
        let mut body = rb.0.clone();
        body.position = transform.position.as_dvec3();
        body.orientation = transform.rotation;
        entities.push(entity);
        bodies.push(body);
    }

    let substeps = physics.step(&mut bodies, delta_time);
    if substeps == 0 {
        return 0;
    }

    for (entity, body) in entities.into_iter().zip(bodies) {
        if let Ok((transform, rb)) = world.query_one_mut::<(&mut Transform, &mut RigidBody)>(entity) {
            transform.position = body.position_f32();
            transform.rotation = body.orientation;
            rb.0 = body;
        }
    }
    substeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::Shape;
    use crate::physics::PhysicsConfig;
    use glam::Vec3;

    #[test]
    fn test_physics_system_free_fall() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());

        let entity = world.spawn((
            Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
            RigidBody::new_dynamic(Shape::sphere(0.5).unwrap(), 1.0),
        ));

        // Simulate ~1 second
        for _ in 0..60 {
            physics_system(&mut world, &mut physics, 1.0 / 60.0 + 1e-9);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!(
            transform.position.y < 10.0,
            "Body should have fallen: y = {}",
            transform.position.y
        );
        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert!(rb.body().linear_velocity.y < -9.0);
        assert!((rb.body().position_f32() - transform.position).length() < 1e-6);
    }

    #[test]
    fn test_physics_system_static_ground() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());

        let ball = world.spawn((
            Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            RigidBody::new_dynamic(Shape::sphere(0.5).unwrap(), 1.0),
        ));
        let ground = world.spawn((
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
            RigidBody::new_static(Shape::from_half_extents(Vec3::new(10.0, 0.5, 10.0)).unwrap()),
        ));

        for _ in 0..120 {
            physics_system(&mut world, &mut physics, 1.0 / 60.0 + 1e-9);
        }

        let ball_y = world.get::<&Transform>(ball).unwrap().position.y;
        assert!(ball_y > 0.2, "Ball should rest on the ground: y = {}", ball_y);
        let ground_y = world.get::<&Transform>(ground).unwrap().position.y;
        assert!((ground_y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_physics_system_no_step_leaves_world() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let entity = world.spawn((
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            RigidBody::new_dynamic(Shape::sphere(0.5).unwrap(), 1.0),
        ));
        assert_eq!(physics_system(&mut world, &mut physics, 0.001), 0);
        let transform = world.get::<&Transform>(entity).unwrap();
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
