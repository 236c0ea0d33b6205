//! Criterion micro-benchmarks for extent bisection and grid block construction.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_bench::{reference_grid, slab_grid};
use strata_core::Extent;
use strata_partition::{ExtentPartitioner, GridPartitioner};

fn bench_rcb(c: &mut Criterion) {
    let extent = Extent::new([0, 1023, 0, 1023, 0, 511]);
    let mut group = c.benchmark_group("rcb_partition");
    for n in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut rcb = ExtentPartitioner::new(extent, n).with_ghost_layers(1);
                rcb.partition().unwrap();
                black_box(rcb.number_of_total_extents());
            });
        });
    }
    group.finish();
}

fn bench_rcb_exclusive(c: &mut Criterion) {
    let extent = Extent::new([0, 4095, 0, 4095, 0, 0]);
    c.bench_function("rcb_partition_exclusive_plane_1024", |b| {
        b.iter(|| {
            let mut rcb = ExtentPartitioner::new(extent, 1024).with_duplicate_nodes(false);
            rcb.partition().unwrap();
            black_box(rcb.extents().len());
        });
    });
}

fn bench_grid_blocks(c: &mut Criterion) {
    let grid = reference_grid().unwrap();
    c.bench_function("grid_blocks_1m_nodes_8_ghost2", |b| {
        b.iter(|| {
            let blocks = GridPartitioner::new(8)
                .with_ghost_layers(2)
                .partition(&grid)
                .unwrap();
            black_box(blocks.len());
        });
    });

    let slab = slab_grid().unwrap();
    c.bench_function("grid_blocks_slab_64_ghost1", |b| {
        b.iter(|| {
            let blocks = GridPartitioner::new(64)
                .with_ghost_layers(1)
                .partition(&slab)
                .unwrap();
            black_box(blocks.len());
        });
    });
}

criterion_group!(benches, bench_rcb, bench_rcb_exclusive, bench_grid_blocks);
criterion_main!(benches);
