//! Shared setup helpers for bezel benchmarks.
//!
//! ## Running
//!
//! Criterion (wall-clock time):
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- broadphase
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- epa

use bezel::physics::rigid_body::Body;
use bezel::physics::shape::Shape;
use glam::{DVec3, Vec3};

// ---------------------------------------------------------------------------
// Basic scenes
// ---------------------------------------------------------------------------

/// `n` dynamic spheres in a grid layout so roughly half overlap.
pub fn setup_sphere_bodies(n: usize) -> anyhow::Result<Vec<Body>> {
    let cols = (n as f32).sqrt().ceil() as usize;
    let shape = Shape::sphere(1.0)?;

    Ok((0..n)
        .map(|i| {
            let x = (i % cols) as f64 * 1.5;
            let z = (i / cols) as f64 * 1.5;
            Body::new_dynamic(shape.clone(), 1.0, DVec3::new(x, 0.0, z))
        })
        .collect())
}

/// Mixed scene: dynamic spheres, dynamic boxes and static convex hulls.
pub fn setup_mixed_bodies(n: usize) -> anyhow::Result<Vec<Body>> {
    let cols = (n as f32).sqrt().ceil() as usize;
    let sphere = Shape::sphere(0.5)?;
    let cube = Shape::from_half_extents(Vec3::splat(0.5))?;
    let hull = Shape::convex(&diamond_points())?;

    Ok((0..n)
        .map(|i| {
            let pos = DVec3::new((i % cols) as f64 * 1.2, 0.0, (i / cols) as f64 * 1.2);
            match i % 3 {
                0 => Body::new_dynamic(sphere.clone(), 1.0, pos),
                1 => Body::new_dynamic(cube.clone(), 1.0, pos),
                _ => Body::new_static(hull.clone(), pos),
            }
        })
        .collect())
}

/// Sparse scene: bodies spread far apart so few pairs are found.
pub fn setup_sparse_bodies(n: usize) -> anyhow::Result<Vec<Body>> {
    let shape = Shape::from_half_extents(Vec3::splat(0.5))?;
    Ok((0..n)
        .map(|i| {
            let t = i as f64;
            let pos = DVec3::new(t * 7.0 % 211.0, t * 13.0 % 97.0, t * 3.0);
            Body::new_dynamic(shape.clone(), 1.0, pos)
        })
        .collect())
}

/// A stack of boxes on a static ground slab.
pub fn setup_stack(height: usize) -> anyhow::Result<Vec<Body>> {
    let cube = Shape::from_half_extents(Vec3::splat(0.5))?;
    let slab = Shape::from_half_extents(Vec3::new(20.0, 0.5, 20.0))?;

    let mut bodies = vec![Body::new_static(slab, DVec3::new(0.0, -0.5, 0.0))];
    for i in 0..height {
        let pos = DVec3::new(0.0, 0.5 + i as f64 * 1.01, 0.0);
        bodies.push(Body::new_dynamic(cube.clone(), 1.0, pos));
    }
    Ok(bodies)
}

/// Two unit boxes overlapping by `depth` along x. A negative depth leaves a
/// gap.
pub fn box_pair(depth: f64) -> anyhow::Result<[Body; 2]> {
    let cube = Shape::from_half_extents(Vec3::splat(0.5))?;
    Ok([
        Body::new_dynamic(cube.clone(), 1.0, DVec3::ZERO),
        Body::new_dynamic(cube, 1.0, DVec3::new(1.0 - depth, 0.0, 0.0)),
    ])
}

/// An octahedron stretched along y.
pub fn diamond_points() -> Vec<Vec3> {
    vec![
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(0.0, 0.8, 0.0),
        Vec3::new(0.0, -0.8, 0.0),
        Vec3::new(0.0, 0.0, 0.5),
        Vec3::new(0.0, 0.0, -0.5),
    ]
}
