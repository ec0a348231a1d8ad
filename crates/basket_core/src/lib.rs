//! # Basket Core (L1: Foundation)
//!
//! Market-data containers and matrix algebra for correlated-GBM basket
//! option pricing.
//!
//! This crate provides:
//! - Validated market-data types (`Asset`, `BasketOption`, `OptionParams`)
//! - Correlation and covariance matrices with runtime dimensions
//! - Cholesky decomposition with explicit failure reporting
//! - Closed-form Black-Scholes reference pricing for the single-name case
//!
//! All matrix types are generic over `num_traits::Float`, so the same code
//! serves single- and double-precision runs.
//!
//! ## Example
//!
//! ```
//! use basket_core::matrix::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
//! let factor = corr.cholesky().unwrap();
//! let w = factor.transform(&[1.0, 0.0]);
//! assert!((w[1] - 0.5).abs() < 1e-12);
//! ```

pub mod analytic;
pub mod matrix;
pub mod types;

pub use matrix::{CholeskyFactor, CorrelationMatrix, CovarianceMatrix, MatrixError};
pub use types::{Asset, BasketOption, MarketDataError, OptionParams, OptionValue};
