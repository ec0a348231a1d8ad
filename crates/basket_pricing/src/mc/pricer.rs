//! CPU Monte Carlo pricing engine for basket options.
//!
//! Paths are partitioned across rayon workers. Each worker owns an
//! independent RNG stream and a private `(sum, sum_sq)` accumulator; the
//! reduction runs only after every worker has finished its partition, so
//! there is no shared mutable state during the parallel phase.

use num_traits::Float;
use rayon::prelude::*;
use tracing::debug;

use basket_core::matrix::CholeskyFactor;
use basket_core::types::{BasketOption, OptionParams, OptionValue};

use super::config::MonteCarloConfig;
use super::error::PricingError;
use super::Z_975;
use crate::rng::SimRng;
use crate::simulate::{basket_payoff, terminal_prices_into};

/// Record of one completed pricing job.
///
/// Self-describing: carries the option that was priced alongside the
/// estimate, so a result can be logged or stored without its inputs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingRun<T: Float> {
    /// Price estimate with confidence half-width.
    pub value: OptionValue,
    /// The option that was priced.
    pub option: BasketOption<T>,
    /// Number of underlyings in the priced basket.
    pub n_assets: usize,
    /// Number of simulated paths.
    pub n_paths: usize,
}

/// Multi-threaded CPU Monte Carlo pricer.
///
/// Derives the correlation Cholesky factor once per run, then simulates
/// independent terminal-value paths in parallel and reduces per-worker
/// partial sums into the price estimate.
///
/// # Examples
///
/// ```
/// use basket_core::types::OptionParams;
/// use basket_pricing::mc::{BasketPricer, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder().n_paths(10_000).seed(1).build().unwrap();
/// let pricer = BasketPricer::new(config);
///
/// let option = OptionParams::new(100.0_f64, 100.0, 0.05, 0.2, 1.0).unwrap();
/// let run = pricer.price(&option.to_basket()).unwrap();
/// assert!(run.value.expected > 0.0);
/// ```
pub struct BasketPricer {
    config: MonteCarloConfig,
}

impl BasketPricer {
    /// Creates a pricer with the given configuration.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Prices a basket call option.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Matrix`] if the correlation matrix fails
    /// Cholesky factorisation (not positive definite).
    pub fn price<T>(&self, option: &BasketOption<T>) -> Result<PricingRun<T>, PricingError>
    where
        T: Float + Send + Sync,
    {
        let factor = option.correlation().cholesky()?;
        let n_paths = self.config.n_paths();
        let n_threads = self.config.n_threads().min(n_paths);
        let base_seed = self.config.seed().unwrap_or(0);

        debug!(
            n_assets = option.dim(),
            n_paths,
            n_threads,
            "dispatching basket pricing batch"
        );

        let spots = option.spots();
        let vols = option.volatilities();
        let weights = option.weights();
        let drifts = option.drifts();

        // Parallel phase: each worker simulates its own partition with a
        // private accumulator, then a single reduction combines partials.
        let (sum, sum_sq) = (0..n_threads)
            .into_par_iter()
            .map(|worker| {
                let paths = partition_size(n_paths, n_threads, worker);
                simulate_partition(
                    SimRng::stream(base_seed, worker),
                    paths,
                    &spots,
                    &vols,
                    &weights,
                    &drifts,
                    &factor,
                    option.strike,
                    option.rate,
                    option.maturity,
                )
            })
            .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

        let value = aggregate(sum, sum_sq, n_paths);
        debug!(
            expected = value.expected,
            confidence = value.confidence,
            "pricing batch complete"
        );

        Ok(PricingRun {
            value,
            option: option.clone(),
            n_assets: option.dim(),
            n_paths,
        })
    }

    /// Prices a single-name European call by degenerating to a one-asset
    /// basket with weight 1.
    ///
    /// # Errors
    ///
    /// Propagates any [`PricingError`] from the basket engine.
    pub fn price_single<T>(&self, option: &OptionParams<T>) -> Result<PricingRun<T>, PricingError>
    where
        T: Float + Send + Sync,
    {
        self.price(&option.to_basket())
    }
}

/// Number of paths assigned to `worker` when `total` paths are spread over
/// `workers` partitions: the remainder goes to the lowest worker indices.
#[inline]
fn partition_size(total: usize, workers: usize, worker: usize) -> usize {
    total / workers + usize::from(worker < total % workers)
}

/// Runs one worker's partition and returns its partial `(sum, sum_sq)`.
///
/// Accumulation is always in `f64`, whatever precision the path arithmetic
/// uses.
#[allow(clippy::too_many_arguments)]
fn simulate_partition<T: Float>(
    mut rng: SimRng,
    paths: usize,
    spots: &[T],
    vols: &[T],
    weights: &[T],
    drifts: &[T],
    factor: &CholeskyFactor<T>,
    strike: T,
    rate: T,
    maturity: T,
) -> (f64, f64) {
    let n = spots.len();
    let mut z = vec![T::zero(); n];
    let mut correlated = vec![T::zero(); n];
    let mut shocks = vec![T::zero(); n];
    let mut terminal = vec![T::zero(); n];

    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;

    for _ in 0..paths {
        rng.fill_normal(&mut z);
        factor.transform_into(&z, &mut correlated);
        // Scale the unit-variance correlated shocks by each asset's
        // volatility; drift (usually zero) is added on top, never the
        // risk-neutral term, which lives in the GBM exponent.
        for i in 0..n {
            shocks[i] = drifts[i] + vols[i] * correlated[i];
        }
        terminal_prices_into(spots, vols, &shocks, maturity, rate, &mut terminal);
        let payoff = basket_payoff(&terminal, weights, strike, rate, maturity)
            .to_f64()
            .unwrap_or(f64::NAN);
        sum += payoff;
        sum_sq += payoff * payoff;
    }

    (sum, sum_sq)
}

/// Combines global sums into the price estimate.
///
/// Population variance `sum_sq/n - mean^2`, clamped at zero so a
/// deterministic (zero-volatility) batch reports confidence exactly 0
/// instead of NaN from floating-point cancellation.
pub(crate) fn aggregate(sum: f64, sum_sq: f64, n_paths: usize) -> OptionValue {
    let n = n_paths as f64;
    let expected = sum / n;
    let variance = (sum_sq / n - expected * expected).max(0.0);
    let confidence = Z_975 * (variance / n).sqrt();
    OptionValue::new(expected, confidence)
}
