//! Error types for the Monte Carlo engines.
//!
//! Simulation runs are deterministic given their seeds and either fully
//! succeed or abort. Numeric validation errors are returned to the caller;
//! partial results are never reported as complete.

use basket_core::matrix::MatrixError;
use basket_core::types::MarketDataError;
use thiserror::Error;

/// Configuration error for the Monte Carlo engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Path count outside `[1, MAX_PATHS]`.
    #[error("Invalid path count {0}: must be in range [1, 10_000_000]")]
    InvalidPathCount(usize),

    /// Thread count must be at least 1.
    #[error("Invalid thread count {0}: must be at least 1")]
    InvalidThreadCount(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Errors raised while pricing.
///
/// Matrix and market-data failures are recoverable at the call boundary;
/// the caller decides whether to fix the inputs or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Correlation/covariance validation or factorisation failed.
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Market data failed validation at the engine boundary.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Engine configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = ConfigError::InvalidPathCount(0);
        assert!(err.to_string().contains("Invalid path count 0"));

        let err: PricingError = MatrixError::NotPositiveDefinite { row: 2 }.into();
        assert!(err.to_string().contains("positive definite"));

        let err: PricingError = MarketDataError::EmptyBasket.into();
        assert!(err.to_string().contains("Empty basket"));
    }
}
