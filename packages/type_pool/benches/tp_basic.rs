//! Basic benchmarks for the `type_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use type_pool::PoolRegistry;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BUFFER_CAPACITY: usize = 4096;

fn new_buffer() -> Vec<u8> {
    Vec::with_capacity(BUFFER_CAPACITY)
}

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("tp_cycle");

    group.bench_function("allocate_without_pool", |b| {
        b.iter(|| {
            drop(black_box(new_buffer()));
        });
    });

    group.bench_function("create_recycle_warm", |b| {
        let registry = PoolRegistry::new();
        registry.recycle(registry.create(new_buffer));

        b.iter(|| {
            let buffer = registry.create(new_buffer);
            registry.recycle(black_box(buffer));
        });
    });

    group.bench_function("create_recycle_with_reset", |b| {
        let registry = PoolRegistry::new();
        registry.recycle(registry.create(new_buffer));
        registry.set_pool_reset_action(|buffer: &mut Vec<u8>| buffer.clear());

        b.iter(|| {
            let mut buffer = registry.create(new_buffer);
            buffer.push(1);
            registry.recycle(black_box(buffer));
        });
    });

    group.bench_function("recycle_into_full_pool", |b| {
        let registry = PoolRegistry::builder().max_capacity(1).build();
        registry.recycle(registry.create(new_buffer));

        b.iter(|| {
            registry.recycle(black_box(Vec::<u8>::new()));
        });
    });

    group.finish();

    let mut sizing_group = c.benchmark_group("tp_sizing");

    sizing_group.bench_function("set_pool_size_1000", |b| {
        let registry = PoolRegistry::new();
        drop(registry.create(new_buffer));

        b.iter(|| {
            registry.set_pool_size(1000, new_buffer).unwrap();
            registry.clear_pool::<Vec<u8>>();
        });
    });

    sizing_group.bench_function("many_types_lookup", |b| {
        let registry = PoolRegistry::new();
        drop(registry.create(|| 0_u8));
        drop(registry.create(|| 0_u16));
        drop(registry.create(|| 0_u32));
        drop(registry.create(|| 0_u64));
        drop(registry.create(String::new));

        b.iter(|| black_box(registry.pool_count::<u64>()));
    });

    sizing_group.finish();
}
