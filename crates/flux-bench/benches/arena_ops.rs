//! Criterion micro-benchmarks for arena growth and commit.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use flux_arena::{ArenaConfig, GrowableArena};

/// Benchmark: grow from 16 bytes to 1 MiB in 4 KiB reserve/commit steps.
fn bench_arena_grow_1mib(c: &mut Criterion) {
    let chunk = vec![7u8; 4096];
    c.bench_function("arena_grow_1mib", |b| {
        b.iter(|| {
            let mut arena =
                GrowableArena::new(ArenaConfig::new(1 << 20).with_initial_capacity(16)).unwrap();
            for _ in 0..256 {
                let region = arena.reserve(chunk.len()).unwrap();
                arena.write(region, &chunk).unwrap();
                arena.commit(chunk.len()).unwrap();
            }
            black_box(arena.relocations());
        });
    });
}

/// Benchmark: shrink an over-allocated arena to its exact size.
fn bench_arena_resize_exact(c: &mut Criterion) {
    c.bench_function("arena_resize_exact", |b| {
        b.iter(|| {
            let mut arena = GrowableArena::new(ArenaConfig::default()).unwrap();
            let region = arena.reserve(36).unwrap();
            arena.write(region, &[1; 36]).unwrap();
            arena.commit(36).unwrap();
            arena.resize_exact(1 << 20).unwrap();
            black_box(arena.extent());
        });
    });
}

criterion_group!(benches, bench_arena_grow_1mib, bench_arena_resize_exact);
criterion_main!(benches);
