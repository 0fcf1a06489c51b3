//! Criterion comparison of the five reduction strategies.
//!
//! Run with: cargo bench --bench reduce_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

use cohort_reduce::{reduce_revenue, DenseArray, ProblemDims, Strategy};

fn make_inputs(dims: &ProblemDims, seed: u64) -> (DenseArray<f32>, DenseArray<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut revenue = DenseArray::uninit(&dims.revenue_dims());
    revenue.fill(|_| rng.gen_range(0..10) as f32);
    let mut cost = DenseArray::uninit(&dims.slot_dims());
    cost.fill(|_| rng.gen_range(0..100) as f32 / 10.0);
    (revenue, cost)
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_revenue");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for n in [64usize, 256, 1024] {
        let dims = ProblemDims::new(4, 5, n, n);
        let elements = dims.slots() * dims.cohorts;
        group.throughput(Throughput::Elements(elements as u64));

        let (revenue, cost) = make_inputs(&dims, 42);

        for strategy in Strategy::ALL {
            group.bench_with_input(BenchmarkId::new(strategy.name(), n), &n, |bench, _| {
                let mut profit = DenseArray::<f32>::zeroed(&dims.slot_dims());
                bench.iter(|| {
                    profit.fill(|_| 0.0);
                    reduce_revenue(strategy, &revenue, &cost, &mut profit, &dims).unwrap();
                });
            });
        }
    }
    group.finish();
}

/// Inner-sum shape comparison at a fixed slot count: how much of the gap
/// between the flat and vectorized strategies survives as `M` shrinks below
/// one chunk.
fn bench_cohort_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohort_width");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for m in [8usize, 16, 20, 512] {
        let dims = ProblemDims::new(4, 5, 512, m);
        group.throughput(Throughput::Elements((dims.slots() * m) as u64));

        let (revenue, cost) = make_inputs(&dims, 42);

        for strategy in [Strategy::Flat, Strategy::Vectorized] {
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), m),
                &m,
                |bench, _| {
                    let mut profit = DenseArray::<f32>::zeroed(&dims.slot_dims());
                    bench.iter(|| {
                        profit.fill(|_| 0.0);
                        reduce_revenue(strategy, &revenue, &cost, &mut profit, &dims).unwrap();
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_cohort_widths);
criterion_main!(benches);
