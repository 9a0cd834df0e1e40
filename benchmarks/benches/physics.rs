//! Physics engine benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- broadphase

use bezel::physics::broadphase::broad_phase_into;
use bezel::physics::narrowphase::epa::epa_expand;
use bezel::physics::narrowphase::gjk::{gjk_closest_points, gjk_intersection, gjk_intersects};
use bezel::physics::narrowphase::support::support;
use bezel::physics::narrowphase::{intersects, intersects_static};
use bezel::physics::rigid_body::Body;
use bezel::physics::shape::Shape;
use bezel::physics::{PhysicsConfig, PhysicsWorld};
use bezel_bench::*;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::{DVec3, Vec3};

const DT: f32 = 1.0 / 60.0;

type SceneFn = fn(usize) -> anyhow::Result<Vec<Body>>;

// ---------------------------------------------------------------------------
// Broadphase
// ---------------------------------------------------------------------------

fn bench_broadphase(c: &mut Criterion) {
    let scenes: [(&str, SceneFn); 3] = [
        ("broadphase/uniform_spheres", setup_sphere_bodies),
        ("broadphase/mixed_shapes", setup_mixed_bodies),
        ("broadphase/sparse", setup_sparse_bodies),
    ];

    for (name, setup) in scenes {
        let mut group = c.benchmark_group(name);
        for &n in &[100, 500, 1000, 2000] {
            let Ok(bodies) = setup(n) else { continue };
            let mut pairs = Vec::new();
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| broad_phase_into(&bodies, &mut pairs, DT));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Narrowphase
// ---------------------------------------------------------------------------

fn bench_gjk(c: &mut Criterion) {
    let mut group = c.benchmark_group("gjk");

    if let Ok([a, b]) = box_pair(-1.0) {
        group.bench_function("separated", |bench| {
            bench.iter(|| gjk_intersects(&a, &b));
        });
        group.bench_function("closest_points", |bench| {
            bench.iter(|| gjk_closest_points(&a, &b));
        });
    }

    if let Ok([a, b]) = box_pair(0.1) {
        group.bench_function("intersecting", |bench| {
            bench.iter(|| gjk_intersects(&a, &b));
        });
    }
    group.finish();
}

fn bench_epa(c: &mut Criterion) {
    let mut group = c.benchmark_group("epa");

    if let Ok([a, b]) = box_pair(0.1) {
        group.bench_function("box_box", |bench| {
            bench.iter(|| gjk_intersection(&a, &b, 0.001));
        });

        let seed = [
            support(&a, &b, Vec3::new(1.0, 1.0, 1.0), 0.0),
            support(&a, &b, Vec3::new(-1.0, -1.0, 1.0), 0.0),
            support(&a, &b, Vec3::new(-1.0, 1.0, -1.0), 0.0),
            support(&a, &b, Vec3::new(1.0, -1.0, -1.0), 0.0),
        ];
        group.bench_function("expand_only", |bench| {
            bench.iter(|| epa_expand(&a, &b, 0.0, &seed));
        });
    }

    if let Ok(hull) = Shape::convex(&diamond_points()) {
        let a = Body::new_dynamic(hull.clone(), 1.0, DVec3::ZERO);
        let b = Body::new_dynamic(hull, 1.0, DVec3::new(0.3, 0.4, 0.1));
        group.bench_function("convex_convex", |bench| {
            bench.iter(|| gjk_intersection(&a, &b, 0.001));
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("narrowphase");

    if let Ok(pair) = box_pair(0.1) {
        group.bench_function("static_box_box", |bench| {
            bench.iter(|| intersects_static(&pair, 0, 1));
        });
    }

    if let Ok([a, b]) = box_pair(-2.0) {
        let mut pair = [a.with_velocity(Vec3::new(150.0, 0.0, 0.0)), b];
        group.bench_function("conservative_advance", |bench| {
            bench.iter(|| intersects(&mut pair, 0, 1, DT));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/full_step");
    for &n in &[100, 500, 1000] {
        let Ok(bodies) = setup_mixed_bodies(n) else { continue };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter_batched(
                || (bodies.clone(), PhysicsWorld::new(PhysicsConfig::default())),
                |(mut bodies, mut physics)| physics.fixed_step(&mut bodies, DT),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();

    let mut group = c.benchmark_group("pipeline/stack");
    for &height in &[5, 10] {
        let Ok(bodies) = setup_stack(height) else { continue };
        group.bench_with_input(BenchmarkId::from_parameter(height), &height, |b, _| {
            b.iter_batched(
                || (bodies.clone(), PhysicsWorld::new(PhysicsConfig::default())),
                |(mut bodies, mut physics)| {
                    for _ in 0..10 {
                        physics.fixed_step(&mut bodies, DT);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_broadphase,
    bench_gjk,
    bench_epa,
    bench_dispatch,
    bench_full_tick
);
criterion_main!(benches);
