//! Criterion micro-benchmarks for local binning and threaded reduction.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strata_bench::{grid_field, reference_grid};
use strata_comm::{SelfComm, ThreadGroup};
use strata_core::Collective;
use strata_histogram::{DistributedHistogram, ReportTarget};
use strata_test_utils::fixtures::{random_mask, split_values};

fn bench_local(c: &mut Criterion) {
    let grid = reference_grid().unwrap();
    let field = grid_field(&grid, 7);
    let mask = random_mask(7, field.len(), 0.1);
    let comm = SelfComm::new();

    c.bench_function("histogram_1m_values_64_bins", |b| {
        b.iter(|| {
            let mut hist = DistributedHistogram::new();
            hist.add_range(&field, None).unwrap();
            hist.pre_compute(&comm, 64).unwrap();
            hist.compute(&field, None).unwrap();
            black_box(hist.local_counts()[0]);
        });
    });

    c.bench_function("histogram_1m_values_masked", |b| {
        b.iter(|| {
            let mut hist = DistributedHistogram::new();
            hist.add_range(&field, Some(&mask)).unwrap();
            hist.pre_compute(&comm, 64).unwrap();
            hist.compute(&field, Some(&mask)).unwrap();
            black_box(hist.local_counts()[0]);
        });
    });
}

fn bench_threaded(c: &mut Criterion) {
    let grid = reference_grid().unwrap();
    let field = grid_field(&grid, 11);
    let parts = split_values(&field, 4);

    c.bench_function("histogram_threaded_4_ranks", |b| {
        b.iter(|| {
            let results = ThreadGroup::run(4, |comm| {
                let local = &parts[comm.rank()];
                let mut hist = DistributedHistogram::new();
                hist.add_range(local, None).unwrap();
                hist.pre_compute(&comm, 64).unwrap();
                hist.compute(local, None).unwrap();
                hist.post_compute(&comm, &ReportTarget::Silent, 0, 0.0, "grid", "field")
                    .unwrap();
                hist.global_counts().map(<[u64]>::len)
            });
            black_box(results.len());
        });
    });
}

criterion_group!(benches, bench_local, bench_threaded);
criterion_main!(benches);
