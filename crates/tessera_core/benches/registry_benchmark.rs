//! # Registry Lifecycle Benchmark
//!
//! Measures entity creation (including capacity doubling), kill/create
//! recycling, and raw vs typed component access.
//!
//! Run with: `cargo bench --package tessera_core --bench registry_benchmark`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{Component, ComponentDescriptor, Registry, RegistryConfig};

/// Entity count typical of the target simulation loop.
const ENTITY_COUNT: usize = 50_000;

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Position {}

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Velocity {}

fn config() -> RegistryConfig {
    RegistryConfig::default()
        .with_component(ComponentDescriptor::of::<Position>())
        .with_component(ComponentDescriptor::of::<Velocity>())
}

/// Benchmark: create entities from the default capacity (many doublings).
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut registry = Registry::new(&config()).unwrap();
                for _ in 0..count {
                    black_box(registry.create().unwrap());
                }
                registry.entity_count()
            });
        });
    }

    group.finish();
}

/// Benchmark: kill and recreate through the id pool (no growth).
fn bench_kill_create_cycle(c: &mut Criterion) {
    let mut registry = Registry::new(&config()).unwrap();
    let mut ids: Vec<_> = (0..ENTITY_COUNT).map(|_| registry.create().unwrap()).collect();

    c.bench_function("kill_create_cycle_10K", |b| {
        b.iter(|| {
            for id in ids.iter().take(10_000) {
                registry.kill(*id).unwrap();
            }
            for id in ids.iter_mut().take(10_000) {
                *id = registry.create().unwrap();
            }
            black_box(registry.alive_count())
        });
    });
}

/// Benchmark: integrate velocity into position for every entity.
#[allow(clippy::cast_precision_loss)]
fn bench_component_access(c: &mut Criterion) {
    let mut registry = Registry::new(&config()).unwrap();
    let pos = registry.component_type::<Position>(0).unwrap();
    let vel = registry.component_type::<Velocity>(1).unwrap();

    let ids: Vec<_> = (0..ENTITY_COUNT)
        .map(|i| {
            let e = registry.create().unwrap();
            let f = i as f32;
            registry.insert(e, pos, Position { x: f, y: f, z: f }).unwrap();
            registry.insert(e, vel, Velocity { x: 0.1, y: 0.2, z: 0.3 }).unwrap();
            e
        })
        .collect();

    let mut group = c.benchmark_group("component_access");

    group.bench_function("typed_integrate_50K", |b| {
        b.iter(|| {
            for &e in &ids {
                let v = registry.read(e, vel).unwrap().unwrap_or_default();
                registry
                    .write_with(e, pos, |p| {
                        p.x += v.x * 0.016;
                        p.y += v.y * 0.016;
                        p.z += v.z * 0.016;
                    })
                    .unwrap();
            }
        });
    });

    group.bench_function("raw_read_50K", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &e in &ids {
                sum += u64::from(registry.get(e, 0).unwrap()[0]);
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_create,
    bench_kill_create_cycle,
    bench_component_access,
);

criterion_main!(benches);
