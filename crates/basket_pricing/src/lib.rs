//! # Basket Pricing (L2: Simulation Engines)
//!
//! Parallel Monte Carlo pricing of European basket calls under correlated
//! Geometric Brownian Motion.
//!
//! This crate provides:
//! - Seeded, stream-splittable random number generation ([`rng::SimRng`])
//! - Random market-data sampling for prototyping ([`market::MarketSampler`])
//! - Correlated Gaussian vectors and single-step GBM propagation
//!   ([`simulate`])
//! - A multi-threaded CPU aggregator ([`mc::BasketPricer`]) built on rayon
//! - An equivalent GPU aggregator behind the `gpu` feature
//!   ([`gpu::GpuBasketPricer`], wgpu compute shaders)
//!
//! ## Concurrency model
//!
//! Market data, covariance and the Cholesky factor are derived once per run
//! and shared read-only. Each worker (CPU thread or GPU invocation) owns an
//! independent RNG stream and a private `(sum, sum_sq)` accumulator; a single
//! reduction after all workers complete combines the partials. No shared
//! mutable state exists during the parallel phase, and a dispatched batch
//! always runs to completion.
//!
//! ## Example
//!
//! ```
//! use basket_core::types::{Asset, BasketOption};
//! use basket_core::matrix::CorrelationMatrix;
//! use basket_pricing::mc::{BasketPricer, MonteCarloConfig};
//!
//! let assets = vec![
//!     Asset::new(100.0_f64, 0.2, 0.5).unwrap(),
//!     Asset::new(95.0, 0.25, 0.5).unwrap(),
//! ];
//! let corr = CorrelationMatrix::new(&[1.0, 0.3, 0.3, 1.0], 2).unwrap();
//! let option = BasketOption::new(assets, corr, 100.0, 1.0, 0.05).unwrap();
//!
//! let config = MonteCarloConfig::builder()
//!     .n_paths(10_000)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let pricer = BasketPricer::new(config);
//! let run = pricer.price(&option).unwrap();
//! println!("{:.4} +/- {:.4}", run.value.expected, run.value.confidence);
//! ```

pub mod market;
pub mod mc;
pub mod rng;
pub mod simulate;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use mc::{BasketPricer, MonteCarloConfig, PricingError, PricingRun};
pub use rng::SimRng;
