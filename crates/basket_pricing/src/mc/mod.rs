//! Monte Carlo aggregation engines.
//!
//! The CPU engine lives here; the GPU equivalent is in [`crate::gpu`]
//! behind the `gpu` feature. Both share the same statistical contract:
//!
//! - `expected = total_sum / n_paths`
//! - `variance = total_sum_sq / n_paths - expected^2` (clamped at zero)
//! - `confidence = 1.96 * sqrt(variance / n_paths)` (95% two-sided CLT)

mod config;
mod error;
pub(crate) mod pricer;

pub use config::{MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_PATHS, MAX_PATHS};
pub use error::{ConfigError, PricingError};
pub use pricer::{BasketPricer, PricingRun};

/// 97.5% standard normal quantile: half-width multiplier of the 95%
/// two-sided confidence interval.
pub const Z_975: f64 = 1.96;
