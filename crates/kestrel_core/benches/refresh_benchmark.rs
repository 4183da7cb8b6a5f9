//! # Refresh Benchmark
//!
//! Measures the per-tick cost of partitioning entities and re-matching them
//! against systems.
//!
//! Run with: `cargo bench --package kestrel_core --bench refresh_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use kestrel_core::{Component, EntityStorage, FrameTime, KindRegistry, Membership, System, World};

struct Position(f32);
impl Component for Position {}

struct Velocity(f32);
impl Component for Velocity {}

/// Integrates every member that carries both kinds.
struct Integrate {
    membership: Membership,
}

impl Integrate {
    fn new(registry: &KindRegistry) -> Self {
        Self {
            membership: Membership::new()
                .with_component::<Position>(registry)
                .with_component::<Velocity>(registry),
        }
    }
}

impl System for Integrate {
    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn membership_mut(&mut self) -> &mut Membership {
        &mut self.membership
    }

    fn update(&mut self, frame: &FrameTime, entities: &mut EntityStorage) -> bool {
        for &handle in self.membership.members() {
            let Some(entity) = entities.get_mut(handle) else {
                continue;
            };
            let Ok(velocity) = entity.get_component::<Velocity>().map(|v| v.0) else {
                continue;
            };
            if let Ok(position) = entity.get_component_mut::<Position>() {
                position.0 += velocity * frame.substep_time;
            }
        }
        true
    }
}

/// Every third entity disabled, every other one moving.
fn populate(count: usize) -> World {
    let mut world = World::with_capacity(KindRegistry::new(), count);
    world.add_system_with(Integrate::new);
    for index in 0..count {
        let entity = world.add_entity(index % 3 != 0);
        entity.add_component(Position(0.0));
        if index % 2 == 0 {
            entity.add_component(Velocity(1.0));
        }
    }
    world
}

/// Benchmark: first refresh links everything.
fn bench_initial_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_refresh");
    group.sample_size(20);

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || populate(count),
                |mut world| {
                    world.refresh();
                    black_box(world.active_entity_count())
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark: steady-state refresh where nothing changed.
fn bench_steady_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_refresh");

    for count in [1_000, 10_000] {
        let mut world = populate(count);
        world.refresh();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                world.refresh();
                black_box(world.active_entity_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: full world update (refresh + dispatch).
fn bench_world_update(c: &mut Criterion) {
    let mut world = populate(10_000);
    let frame = FrameTime::default();
    world.refresh();

    c.bench_function("world_update_10k", |b| {
        b.iter(|| black_box(world.update(black_box(&frame))));
    });
}

criterion_group!(
    benches,
    bench_initial_refresh,
    bench_steady_refresh,
    bench_world_update,
);

criterion_main!(benches);
