//! Headless demo: boxes, balls and a hull dropped onto a static slab.
//!
//! Run with: RUST_LOG=info cargo run --manifest-path bezel-app/Cargo.toml
//! Per-step engine logs: RUST_LOG=bezel=debug

use bezel::ecs::components::physics::RigidBody;
use bezel::ecs::components::transform::Transform;
use bezel::ecs::systems::physics::physics_system;
use bezel::physics::shape::Shape;
use bezel::physics::{PhysicsConfig, PhysicsWorld};
use glam::{Quat, Vec3};

/// Frames to simulate
const FRAMES: usize = 300;
/// Frame delta in seconds
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Log every this many frames
const REPORT_EVERY: usize = 60;

fn spawn_scene(world: &mut hecs::World) -> anyhow::Result<()> {
    // Ground
    world.spawn((
        Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
        RigidBody::new_static(Shape::from_half_extents(Vec3::new(20.0, 0.5, 20.0))?),
    ));

    let cube = Shape::from_half_extents(Vec3::splat(0.4))?;
    let ball = Shape::sphere(0.4)?;
    let hull = Shape::convex(&[
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(0.0, 0.7, 0.0),
        Vec3::new(0.0, -0.7, 0.0),
        Vec3::new(0.0, 0.0, 0.5),
        Vec3::new(0.0, 0.0, -0.5),
    ])?;

    for i in 0..4 {
        let x = i as f32 * 1.5 - 2.25;
        world.spawn((
            Transform::from_position_rotation(
                Vec3::new(x, 2.0 + i as f32, 0.0),
                Quat::from_rotation_z(0.2 * i as f32),
            ),
            RigidBody::new_dynamic(cube.clone(), 1.0),
        ));
        world.spawn((
            Transform::from_position(Vec3::new(x, 3.0 + i as f32, 2.0)),
            RigidBody::new_dynamic(ball.clone(), 0.5),
        ));
    }

    // A fast ball thrown sideways across the scene
    world.spawn((
        Transform::from_position(Vec3::new(-8.0, 0.5, -2.0)),
        RigidBody::new_dynamic(ball, 0.5).with_velocity(Vec3::new(25.0, 0.0, 0.0)),
    ));
    world.spawn((
        Transform::from_position(Vec3::new(0.0, 6.0, -2.0)),
        RigidBody::new_dynamic(hull, 2.0),
    ));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = PhysicsConfig::default();
    config.validate()?;
    let mut physics = PhysicsWorld::new(config);

    let mut world = hecs::World::new();
    spawn_scene(&mut world)?;
    log::info!("spawned {} bodies", world.len());

    let mut total_steps = 0;
    for frame in 0..FRAMES {
        total_steps += physics_system(&mut world, &mut physics, FRAME_TIME);

        if frame % REPORT_EVERY == 0 {
            log::info!(
                "frame {frame}: {} contacts in the last step",
                physics.contacts().len()
            );
        }
    }

    log::info!("simulated {total_steps} fixed steps");
    for (entity, (transform, rb)) in world.query::<(&Transform, &RigidBody)>().iter() {
        if rb.body().is_static() {
            continue;
        }
        log::info!(
            "{entity:?}: position {:.3?} speed {:.3}",
            transform.position,
            rb.body().linear_velocity.length()
        );
    }
    Ok(())
}
