//! ECS benchmarks using criterion for historical comparison.

use std::hint::black_box;

use bytemuck::{Pod, Zeroable};
use coyote::{ComponentHandle, EntityHandle, TypeDescriptor, World, type_descriptor};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

const POSITION: TypeDescriptor = type_descriptor!(0, Position);
const VELOCITY: TypeDescriptor = type_descriptor!(1, Velocity);

fn populate(world: &mut World, count: u64) -> Vec<(EntityHandle, ComponentHandle)> {
    (0..count)
        .map(|i| {
            let entity = world.entity_create().unwrap();
            let position = world.component_create(&POSITION).unwrap();
            world
                .component_write(
                    position,
                    &POSITION,
                    &Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                )
                .unwrap();
            world.attach(entity, position, &POSITION).unwrap();
            (entity, position)
        })
        .collect()
}

fn create_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [1, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("entity", count), &count, |b, &count| {
            b.iter(|| {
                let mut world = World::new();
                for _ in 0..count {
                    black_box(world.entity_create().unwrap());
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("with_position", count),
            &count,
            |b, &count| {
                b.iter(|| {
                    let mut world = World::new();
                    black_box(populate(&mut world, count));
                });
            },
        );
    }

    group.finish();
}

fn component_access_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("component_access");

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("read", count), &count, |b, &count| {
            let mut world = World::new();
            let handles = populate(&mut world, count);

            b.iter(|| {
                for &(_, position) in &handles {
                    black_box(world.component_read::<Position>(position, &POSITION).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("get_mut", count), &count, |b, &count| {
            let mut world = World::new();
            let handles = populate(&mut world, count);

            b.iter(|| {
                for &(_, position) in &handles {
                    if let Ok(bytes) = world.component_get_mut(position) {
                        bytes[0] = bytes[0].wrapping_add(1);
                    }
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("iterate", count), &count, |b, &count| {
            let mut world = World::new();
            populate(&mut world, count);

            b.iter(|| {
                let mut sum = 0.0f32;
                for position in world.components_iter_filter(&POSITION) {
                    sum += world.component_read::<Position>(position, &POSITION).unwrap().x;
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn attachment_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("attachment");

    for count in [100, 1000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("attach", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut world = World::new();
                    let handles = populate(&mut world, count);
                    let velocities: Vec<_> = (0..count)
                        .map(|_| world.component_create(&VELOCITY).unwrap())
                        .collect();
                    (world, handles, velocities)
                },
                |(mut world, handles, velocities)| {
                    for (&(entity, _), velocity) in handles.iter().zip(velocities) {
                        world.attach(entity, velocity, &VELOCITY).unwrap();
                    }
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(
            BenchmarkId::new("destroy_and_gc", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || {
                        let mut world = World::new();
                        let handles = populate(&mut world, count);
                        (world, handles)
                    },
                    |(mut world, handles)| {
                        for &(_, position) in handles.iter().step_by(2) {
                            world.component_destroy(position).unwrap();
                        }
                        black_box(world.gc())
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    create_benchmarks,
    component_access_benchmarks,
    attachment_benchmarks,
);

criterion_main!(benches);
