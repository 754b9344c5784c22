//! Benchmarks for [`SkipSet`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ::skipset::SkipSet;

/// Benchmarking sizes
const SIZES: [usize; 4] = [10, 100, 1_000, 10_000];

pub fn benchmark(c: &mut Criterion) {
    insert(c);
    get(c);
    pop_front(c);
    iter(c);
}

/// Benchmarking insertion into a pre-filled set
fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipSet Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut set = SkipSet::with_seed(16, 0x1234_abcd);
            for _ in 0..size {
                set.insert(rng.random::<u32>());
            }

            b.iter(|| {
                set.insert(rng.random::<u32>());
            });
        });
    }
    group.finish();
}

/// Benchmarking point lookups
fn get(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipSet Get");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let set: SkipSet<u32> = std::iter::repeat_with(|| rng.random()).take(size).collect();
            let probes: Vec<u32> = std::iter::repeat_with(|| rng.random()).take(10).collect();

            b.iter(|| {
                for probe in &probes {
                    black_box(set.get(probe));
                }
            });
        });
    }
    group.finish();
}

/// Benchmarking minimum extraction (with reinsertion to keep the size stable)
fn pop_front(c: &mut Criterion) {
    c.bench_function("SkipSet PopFront", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let mut set: SkipSet<u32> = std::iter::repeat_with(|| rng.random()).take(10_000).collect();

        b.iter(|| {
            if let Some(item) = set.pop_front() {
                set.insert(item);
            }
        });
    });
}

/// Benchmarking iteration
fn iter(c: &mut Criterion) {
    c.bench_function("SkipSet Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let set: SkipSet<u32> = std::iter::repeat_with(|| rng.random()).take(10_000).collect();

        b.iter(|| {
            for el in &set {
                black_box(el);
            }
        });
    });
}
