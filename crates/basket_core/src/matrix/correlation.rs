//! Correlation matrix validation and Cholesky factorisation.

use super::MatrixError;
use num_traits::Float;

/// Symmetry/diagonal tolerance used during validation.
const VALIDATION_EPS: f64 = 1e-10;

/// A validated correlation matrix with runtime dimension.
///
/// Invariants enforced at construction:
/// - exactly `dim * dim` elements (row-major)
/// - unit diagonal
/// - symmetric
/// - off-diagonal entries in [-1, 1]
///
/// Positive definiteness is *not* checked here; it is detected exactly where
/// it matters, in [`cholesky`](Self::cholesky), which reports
/// [`MatrixError::NotPositiveDefinite`] rather than producing NaN.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix<T: Float> {
    /// Matrix elements in row-major order.
    data: Vec<T>,
    /// Matrix dimension (n x n).
    dim: usize,
}

impl<T: Float> CorrelationMatrix<T> {
    /// Creates a correlation matrix from a flat row-major array.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError`] if the element count, diagonal, symmetry,
    /// or entry range is invalid.
    pub fn new(data: &[T], dim: usize) -> Result<Self, MatrixError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(MatrixError::DimensionMismatch {
                expected,
                got: data.len(),
            });
        }

        let one = T::one();
        let eps = T::from(VALIDATION_EPS).unwrap_or_else(T::zero);

        for i in 0..dim {
            let diag = data[i * dim + i];
            if (diag - one).abs() > eps {
                return Err(MatrixError::InvalidDiagonal {
                    index: i,
                    value: diag.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let upper = data[i * dim + j];
                let lower = data[j * dim + i];
                if (upper - lower).abs() > eps {
                    return Err(MatrixError::NotSymmetric { i, j });
                }
                if upper < -one || upper > one {
                    return Err(MatrixError::OutOfRange {
                        i,
                        j,
                        value: upper.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Builds a correlation matrix from its strict upper triangle.
    ///
    /// `upper` holds the `n * (n - 1) / 2` off-diagonal entries in row-major
    /// order (`(0,1), (0,2), ..., (n-2,n-1)`); the diagonal is set to 1 and
    /// the lower triangle is mirrored. This is the shape produced by the
    /// market-data sampler.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] on a wrong entry count or
    /// [`MatrixError::OutOfRange`] for entries outside [-1, 1].
    pub fn from_upper_triangle(upper: &[T], dim: usize) -> Result<Self, MatrixError> {
        if dim == 0 {
            return Err(MatrixError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }
        let expected = dim * (dim - 1) / 2;
        if upper.len() != expected {
            return Err(MatrixError::DimensionMismatch {
                expected,
                got: upper.len(),
            });
        }

        let mut data = vec![T::zero(); dim * dim];
        let mut next = 0;
        for i in 0..dim {
            data[i * dim + i] = T::one();
            for j in (i + 1)..dim {
                let rho = upper[next];
                next += 1;
                if rho < -T::one() || rho > T::one() {
                    return Err(MatrixError::OutOfRange {
                        i,
                        j,
                        value: rho.to_f64().unwrap_or(f64::NAN),
                    });
                }
                data[i * dim + j] = rho;
                data[j * dim + i] = rho;
            }
        }

        Ok(Self { data, dim })
    }

    /// Creates an identity correlation matrix (uncorrelated drivers).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![T::zero(); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = T::one();
        }
        Self { data, dim }
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

    /// Computes the lower triangular Cholesky factor `L` with `L * L^T = C`.
    ///
    /// Uses the Cholesky-Banachiewicz recursion. A non-positive diagonal
    /// pivot means the matrix is not positive definite.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotPositiveDefinite`] with the failing row.
    pub fn cholesky(&self) -> Result<CholeskyFactor<T>, MatrixError> {
        cholesky_lower(&self.data, self.dim)
    }
}

/// Performs the Cholesky-Banachiewicz recursion on a flat row-major matrix.
///
/// Shared by [`CorrelationMatrix::cholesky`] and
/// [`CovarianceMatrix::cholesky`](super::CovarianceMatrix::cholesky).
pub(crate) fn cholesky_lower<T: Float>(
    data: &[T],
    n: usize,
) -> Result<CholeskyFactor<T>, MatrixError> {
    let mut lower = vec![T::zero(); n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            if j == i {
                for k in 0..j {
                    let l_jk = lower[j * n + k];
                    sum = sum + l_jk * l_jk;
                }
                let pivot = data[j * n + j] - sum;
                if pivot <= T::zero() {
                    return Err(MatrixError::NotPositiveDefinite { row: j });
                }
                lower[j * n + j] = pivot.sqrt();
            } else {
                for k in 0..j {
                    sum = sum + lower[i * n + k] * lower[j * n + k];
                }
                let l_jj = lower[j * n + j];
                if l_jj <= T::zero() {
                    return Err(MatrixError::NotPositiveDefinite { row: j });
                }
                lower[i * n + j] = (data[i * n + j] - sum) / l_jj;
            }
        }
    }

    Ok(CholeskyFactor {
        data: lower,
        dim: n,
    })
}

/// Lower triangular Cholesky factor.
///
/// Derived once per pricing run and shared read-only across all paths; the
/// transform methods turn independent standard normals into correlated ones.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CholeskyFactor<T: Float> {
    /// Lower triangular elements, row-major. Upper triangle is zero.
    data: Vec<T>,
    /// Matrix dimension.
    dim: usize,
}

impl<T: Float> CholeskyFactor<T> {
    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at `(i, j)`; zero above the diagonal.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        if j > i {
            T::zero()
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transforms independent standard normals into correlated normals.
    ///
    /// Computes `w[i] = sum_{k <= i} L[i][k] * z[k]`.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[T]) -> Vec<T> {
        let mut w = vec![T::zero(); self.dim];
        self.transform_into(z, &mut w);
        w
    }

    /// Transforms into a caller-supplied buffer, avoiding allocation in the
    /// per-path hot loop.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()` or `out.len() < self.dim()`.
    pub fn transform_into(&self, z: &[T], out: &mut [T]) {
        let n = self.dim;
        assert!(
            z.len() >= n && out.len() >= n,
            "buffer length below matrix dimension {}",
            n
        );

        for i in 0..n {
            let mut sum = T::zero();
            for k in 0..=i {
                sum = sum + self.data[i * n + k] * z[k];
            }
            out[i] = sum;
        }
    }

    /// Reconstructs `M[i][j] = sum_k L[i][k] * L[j][k]`.
    ///
    /// Used by round-trip tests and by consumers needing the effective
    /// (factorised) covariance.
    pub fn reconstruct(&self) -> Vec<T> {
        let n = self.dim;
        let mut m = vec![T::zero(); n * n];
        for i in 0..n {
            for j in 0..n {
                let mut sum = T::zero();
                for k in 0..n {
                    sum = sum + self.get(i, k) * self.get(j, k);
                }
                m[i * n + j] = sum;
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_valid_matrix() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.get(0, 1), 0.5);
    }

    #[test]
    fn test_wrong_element_count() {
        let result = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5], 2);
        assert!(matches!(
            result,
            Err(MatrixError::DimensionMismatch {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_bad_diagonal() {
        let result = CorrelationMatrix::new(&[0.9_f64, 0.5, 0.5, 1.0], 2);
        assert!(matches!(result, Err(MatrixError::InvalidDiagonal { .. })));
    }

    #[test]
    fn test_asymmetric() {
        let result = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.3, 1.0], 2);
        assert!(matches!(result, Err(MatrixError::NotSymmetric { .. })));
    }

    #[test]
    fn test_out_of_range() {
        let result = CorrelationMatrix::new(&[1.0_f64, 1.5, 1.5, 1.0], 2);
        assert!(matches!(result, Err(MatrixError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_upper_triangle() {
        let m = CorrelationMatrix::from_upper_triangle(&[0.3_f64, 0.2, 0.4], 3).unwrap();
        assert_eq!(m.get(0, 1), 0.3);
        assert_eq!(m.get(0, 2), 0.2);
        assert_eq!(m.get(1, 2), 0.4);
        assert_eq!(m.get(2, 1), 0.4);
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn test_from_upper_triangle_wrong_count() {
        let result = CorrelationMatrix::from_upper_triangle(&[0.3_f64, 0.2], 3);
        assert!(matches!(result, Err(MatrixError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_from_upper_triangle_zero_dim_rejected() {
        let result = CorrelationMatrix::<f64>::from_upper_triangle(&[], 0);
        assert!(matches!(result, Err(MatrixError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_cholesky_2x2_closed_form() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();
        assert_relative_eq!(l.get(0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(l.get(1, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(l.get(1, 1), 0.75_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(l.get(0, 1), 0.0);
    }

    #[test]
    fn test_cholesky_singular_matrix_rejected() {
        // Perfect correlation makes the matrix singular.
        let m = CorrelationMatrix::new(&[1.0_f64, 1.0, 1.0, 1.0], 2).unwrap();
        assert!(matches!(
            m.cholesky(),
            Err(MatrixError::NotPositiveDefinite { row: 1 })
        ));
    }

    #[test]
    fn test_transform_correlates_components() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();
        let w = l.transform(&[1.0, 0.0]);
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_into_matches_transform() {
        let m = CorrelationMatrix::from_upper_triangle(&[0.3_f64, 0.2, 0.4], 3).unwrap();
        let l = m.cholesky().unwrap();
        let z = [0.7, -1.1, 0.4];
        let mut out = [0.0; 3];
        l.transform_into(&z, &mut out);
        assert_eq!(l.transform(&z), out.to_vec());
    }

    #[test]
    fn test_single_precision() {
        let m = CorrelationMatrix::new(&[1.0_f32, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();
        assert!((l.get(1, 1) - 0.75_f32.sqrt()).abs() < 1e-6);
    }

    // Random symmetric positive definite matrices via A * A^T + n * I,
    // scaled back to unit diagonal so they are valid correlation matrices.
    fn random_correlation(dim: usize, raw: &[f64]) -> CorrelationMatrix<f64> {
        let n = dim;
        let mut gram = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let mut sum = if i == j { n as f64 } else { 0.0 };
                for k in 0..n {
                    sum += raw[i * n + k] * raw[j * n + k];
                }
                gram[i * n + j] = sum;
            }
        }
        let mut corr = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                corr[i * n + j] = gram[i * n + j] / (gram[i * n + i] * gram[j * n + j]).sqrt();
            }
        }
        CorrelationMatrix::new(&corr, n).unwrap()
    }

    proptest! {
        #[test]
        fn prop_cholesky_round_trip(
            dim in 1usize..=10,
            raw in proptest::collection::vec(-1.0f64..1.0, 100),
        ) {
            let m = random_correlation(dim, &raw);
            let l = m.cholesky().unwrap();
            let back = l.reconstruct();
            for i in 0..dim {
                for j in 0..dim {
                    prop_assert!(
                        (back[i * dim + j] - m.get(i, j)).abs() < 1e-9,
                        "round trip failed at ({}, {})", i, j
                    );
                }
            }
        }
    }
}
