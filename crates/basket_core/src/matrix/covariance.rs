//! Covariance matrix construction from volatilities and correlations.

use super::correlation::cholesky_lower;
use super::{CholeskyFactor, CorrelationMatrix, MatrixError};
use num_traits::Float;

/// Covariance matrix built from per-asset standard deviations and a
/// correlation matrix: `cov[i][j] = std[i] * std[j] * corr[i][j]`.
///
/// Symmetric by construction. Derived once per pricing run and shared
/// read-only across all simulated paths.
///
/// # Examples
///
/// ```
/// use basket_core::matrix::{CorrelationMatrix, CovarianceMatrix};
///
/// let corr = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
/// let cov = CovarianceMatrix::build(&[0.2, 0.3], &corr).unwrap();
/// assert!((cov.get(0, 1) - 0.2 * 0.3 * 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CovarianceMatrix<T: Float> {
    /// Matrix elements in row-major order.
    data: Vec<T>,
    /// Matrix dimension (n x n).
    dim: usize,
}

impl<T: Float> CovarianceMatrix<T> {
    /// Builds the covariance matrix from standard deviations and a
    /// correlation matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if `std.len()` disagrees
    /// with the correlation dimension.
    pub fn build(std: &[T], corr: &CorrelationMatrix<T>) -> Result<Self, MatrixError> {
        let n = corr.dim();
        if std.len() != n {
            return Err(MatrixError::DimensionMismatch {
                expected: n,
                got: std.len(),
            });
        }

        let mut data = vec![T::zero(); n * n];
        for i in 0..n {
            for j in 0..n {
                data[i * n + j] = std[i] * std[j] * corr.get(i, j);
            }
        }

        Ok(Self { data, dim: n })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.dim + j]
    }

    /// Computes the lower triangular Cholesky factor of this covariance.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotPositiveDefinite`] on a non-positive
    /// pivot (e.g. a zero-volatility asset makes the matrix singular).
    pub fn cholesky(&self) -> Result<CholeskyFactor<T>, MatrixError> {
        cholesky_lower(&self.data, self.dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_build_entries() {
        let corr = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        let cov = CovarianceMatrix::build(&[0.2, 0.3], &corr).unwrap();
        assert_relative_eq!(cov.get(0, 0), 0.04, epsilon = 1e-12);
        assert_relative_eq!(cov.get(1, 1), 0.09, epsilon = 1e-12);
        assert_relative_eq!(cov.get(0, 1), 0.03, epsilon = 1e-12);
        assert_eq!(cov.get(0, 1), cov.get(1, 0));
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let corr = CorrelationMatrix::identity(3);
        let result = CovarianceMatrix::build(&[0.2_f64, 0.3], &corr);
        assert!(matches!(
            result,
            Err(MatrixError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_cholesky_reconstructs_covariance() {
        let corr =
            CorrelationMatrix::from_upper_triangle(&[0.3_f64, 0.2, 0.4], 3).unwrap();
        let cov = CovarianceMatrix::build(&[0.2, 0.25, 0.3], &corr).unwrap();
        let l = cov.cholesky().unwrap();
        let back = l.reconstruct();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(back[i * 3 + j], cov.get(i, j), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_volatility_is_singular() {
        let corr = CorrelationMatrix::identity(2);
        let cov = CovarianceMatrix::build(&[0.0_f64, 0.2], &corr).unwrap();
        assert!(matches!(
            cov.cholesky(),
            Err(MatrixError::NotPositiveDefinite { row: 0 })
        ));
    }
}
