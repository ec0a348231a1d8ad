//! Correlation and covariance matrices with Cholesky decomposition.
//!
//! All matrices are stored as row-major flat vectors with an explicit
//! runtime dimension, validated at every construction boundary.
//!
//! ## Mathematical background
//!
//! Given `n` independent standard normals `Z`, correlated normals are
//! obtained as `W = L * Z` where `L` is the lower triangular Cholesky
//! factor of the target covariance (or correlation) matrix `M = L * L^T`.

mod correlation;
mod covariance;

pub use correlation::{CholeskyFactor, CorrelationMatrix};
pub use covariance::CovarianceMatrix;

use thiserror::Error;

/// Errors raised by matrix construction and factorisation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// The matrix is not positive definite: Cholesky hit a non-positive
    /// pivot. Reported explicitly instead of propagating NaN.
    #[error("Matrix is not positive definite (non-positive pivot at row {row})")]
    NotPositiveDefinite {
        /// Row index of the failing diagonal term.
        row: usize,
    },

    /// Input length disagrees with the declared dimension.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    DimensionMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        got: usize,
    },

    /// A correlation diagonal element is not 1.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// The matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },

    /// A correlation entry lies outside [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Offending value.
        value: f64,
    },
}
