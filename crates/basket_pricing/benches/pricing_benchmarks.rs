//! Criterion benchmarks for the Monte Carlo pricing engine.
//!
//! Benchmarks cover:
//! - Cholesky factorisation across basket sizes
//! - Correlated Gaussian sampling
//! - End-to-end basket pricing across path counts and thread counts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use basket_core::matrix::CorrelationMatrix;
use basket_core::types::{Asset, BasketOption};
use basket_pricing::market::MarketSampler;
use basket_pricing::simulate::correlated_gaussian_into;
use basket_pricing::{BasketPricer, MonteCarloConfig, SimRng};

/// A synthetic but well-conditioned n-asset basket.
fn make_basket(n: usize) -> BasketOption<f64> {
    let mut sampler = MarketSampler::from_seed(7);
    let vols = sampler.sample_volatilities(n);
    let corr = sampler
        .sample_correlation_matrix(n)
        .expect("non-empty basket");

    let weight = 1.0 / n as f64;
    let assets = vols
        .into_iter()
        .enumerate()
        .map(|(i, v)| Asset::new(90.0 + 5.0 * i as f64, v, weight).expect("valid asset"))
        .collect();

    BasketOption::new(assets, corr, 100.0, 1.0, 0.05).expect("valid basket")
}

fn bench_cholesky(c: &mut Criterion) {
    let mut group = c.benchmark_group("cholesky");

    for n in [2, 4, 8, 16] {
        let mut sampler = MarketSampler::from_seed(13);
        let corr = sampler.sample_correlation_matrix(n).expect("non-empty");

        group.bench_with_input(BenchmarkId::new("factorise", n), &corr, |b, corr| {
            b.iter(|| black_box(corr).cholesky().expect("positive definite"));
        });
    }

    group.finish();
}

fn bench_correlated_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlated_sampling");

    for n in [2, 4, 8] {
        let mut sampler = MarketSampler::from_seed(29);
        let corr = sampler.sample_correlation_matrix(n).expect("non-empty");
        let factor = corr.cholesky().expect("positive definite");
        let drift = vec![0.0_f64; n];

        group.bench_with_input(BenchmarkId::new("draw", n), &factor, |b, factor| {
            let mut rng = SimRng::from_seed(1);
            let mut z = vec![0.0_f64; n];
            let mut out = vec![0.0_f64; n];
            b.iter(|| {
                correlated_gaussian_into(&mut rng, &drift, factor, &mut z, &mut out);
                black_box(out[n - 1])
            });
        });
    }

    group.finish();
}

fn bench_basket_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_pricing");
    group.sample_size(10);

    let option = make_basket(3);

    for n_paths in [10_000, 100_000] {
        let config = MonteCarloConfig::builder()
            .n_paths(n_paths)
            .seed(42)
            .build()
            .expect("valid config");
        let pricer = BasketPricer::new(config);

        group.bench_with_input(
            BenchmarkId::new("paths", n_paths),
            &pricer,
            |b, pricer| {
                b.iter(|| pricer.price(black_box(&option)).expect("pricing succeeds"));
            },
        );
    }

    for n_threads in [1, 4] {
        let config = MonteCarloConfig::builder()
            .n_paths(100_000)
            .n_threads(n_threads)
            .seed(42)
            .build()
            .expect("valid config");
        let pricer = BasketPricer::new(config);

        group.bench_with_input(
            BenchmarkId::new("threads", n_threads),
            &pricer,
            |b, pricer| {
                b.iter(|| pricer.price(black_box(&option)).expect("pricing succeeds"));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cholesky,
    bench_correlated_sampling,
    bench_basket_pricing
);
criterion_main!(benches);
