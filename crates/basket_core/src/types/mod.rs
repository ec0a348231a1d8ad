//! Market-data and result types.
//!
//! This module provides:
//! - [`Asset`]: a single underlying (spot, volatility, weight, drift)
//! - [`BasketOption`]: a weighted basket call on `n` underlyings
//! - [`OptionParams`]: a single-name European option
//! - [`OptionValue`]: Monte Carlo price estimate with confidence half-width
//! - [`MarketDataError`]: validation errors raised at construction

mod asset;
mod option;

pub use asset::Asset;
pub use option::{BasketOption, OptionParams, OptionValue};

use thiserror::Error;

/// Validation errors for market-data construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataError {
    /// Spot price must be strictly positive.
    #[error("Invalid spot price {0}: must be strictly positive")]
    InvalidSpot(f64),

    /// Volatility must be non-negative.
    #[error("Invalid volatility {0}: must be non-negative")]
    InvalidVolatility(f64),

    /// Maturity must be strictly positive.
    #[error("Invalid maturity {0}: must be strictly positive")]
    InvalidMaturity(f64),

    /// Input arrays disagree in length.
    #[error("Dimension mismatch: expected {expected} elements, got {got}")]
    DimensionMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        got: usize,
    },

    /// A basket needs at least one underlying.
    #[error("Empty basket: at least one underlying is required")]
    EmptyBasket,
}
