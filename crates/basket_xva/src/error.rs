//! Error types for XVA calculations.

use basket_pricing::PricingError;
use thiserror::Error;

/// Errors raised while computing exposures or CVA.
#[derive(Debug, Error)]
pub enum XvaError {
    /// A credit parameter failed validation.
    #[error("invalid credit parameter {name}: {value}")]
    InvalidCreditParams {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The exposure schedule is empty.
    #[error("exposure schedule must contain at least one date")]
    EmptySchedule,

    /// The exposure schedule is not strictly increasing and positive.
    #[error("exposure schedule must be strictly increasing and positive at index {index}: {value}")]
    InvalidSchedule {
        /// Index of the offending date.
        index: usize,
        /// Offending date value.
        value: f64,
    },

    /// The underlying Monte Carlo pricing failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}
