//! Random market-data generation for prototyping and stress scenarios.
//!
//! Produces plausible volatility vectors and correlation structures. Two
//! correlation samplers are provided:
//!
//! - [`MarketSampler::sample_correlations`]: raw uniform off-diagonal draws
//!   in (-1, 1). The resulting matrix is *not* guaranteed to be positive
//!   semi-definite; factorisation may reject it.
//! - [`MarketSampler::sample_correlation_matrix`]: constructive generation
//!   via unit-normalised random loading vectors, whose Gram matrix is always
//!   a valid (positive semi-definite, unit-diagonal) correlation matrix.

use crate::rng::SimRng;
use basket_core::matrix::{CorrelationMatrix, MatrixError};

/// Default lower bound for sampled volatilities.
pub const DEFAULT_VOL_MIN: f64 = 0.1;
/// Default upper bound for sampled volatilities.
pub const DEFAULT_VOL_MAX: f64 = 0.4;

/// Random market-data sampler.
///
/// Owns its RNG; every call advances the stream and returns freshly owned
/// data. No I/O is performed.
///
/// # Examples
///
/// ```
/// use basket_pricing::market::MarketSampler;
///
/// let mut sampler = MarketSampler::from_seed(42);
/// let vols = sampler.sample_volatilities(3);
/// assert_eq!(vols.len(), 3);
/// let corr = sampler.sample_correlation_matrix(3).unwrap();
/// assert!(corr.cholesky().is_ok());
/// ```
pub struct MarketSampler {
    rng: SimRng,
    vol_min: f64,
    vol_max: f64,
}

impl MarketSampler {
    /// Creates a sampler with the default volatility range.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SimRng::from_seed(seed),
            vol_min: DEFAULT_VOL_MIN,
            vol_max: DEFAULT_VOL_MAX,
        }
    }

    /// Creates a sampler drawing volatilities from `[vol_min, vol_max)`.
    pub fn with_vol_range(seed: u64, vol_min: f64, vol_max: f64) -> Self {
        Self {
            rng: SimRng::from_seed(seed),
            vol_min,
            vol_max,
        }
    }

    /// Draws `n` volatilities uniformly from the configured range.
    pub fn sample_volatilities(&mut self, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| self.rng.gen_range(self.vol_min, self.vol_max))
            .collect()
    }

    /// Draws the `n * (n - 1) / 2` strict upper-triangle correlation
    /// entries uniformly from (-1, 1).
    ///
    /// The entries pair with
    /// [`CorrelationMatrix::from_upper_triangle`]; the assembled matrix may
    /// fail Cholesky factorisation with
    /// [`MatrixError::NotPositiveDefinite`] -- consumers must factorise (or
    /// otherwise validate) before simulating with it.
    pub fn sample_correlations(&mut self, n: usize) -> Vec<f64> {
        // A basket of fewer than two assets has no off-diagonal entries.
        let count = if n < 2 { 0 } else { n * (n - 1) / 2 };
        (0..count).map(|_| self.rng.gen_range(-1.0, 1.0)).collect()
    }

    /// Generates a correlation matrix that is valid by construction.
    ///
    /// Draws a random unit loading vector per asset; the matrix of pairwise
    /// inner products is a Gram matrix (positive semi-definite) with unit
    /// diagonal. A small ridge pulls the off-diagonals towards zero so the
    /// result stays numerically positive definite for factorisation.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError`] only if `n == 0` (dimension mismatch); for
    /// `n >= 1` construction always succeeds.
    pub fn sample_correlation_matrix(
        &mut self,
        n: usize,
    ) -> Result<CorrelationMatrix<f64>, MatrixError> {
        if n == 0 {
            return Err(MatrixError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }

        // One unit-normalised Gaussian loading row per asset.
        let mut loadings = vec![0.0_f64; n * n];
        for row in loadings.chunks_exact_mut(n) {
            let mut norm_sq = 0.0;
            for x in row.iter_mut() {
                *x = self.rng.gen_normal();
                norm_sq += *x * *x;
            }
            let norm = norm_sq.sqrt();
            for x in row.iter_mut() {
                *x /= norm;
            }
        }

        // Shrink towards identity to keep the smallest eigenvalue away
        // from zero.
        let shrink = 0.98;
        let mut data = vec![0.0_f64; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let mut dot = 0.0;
                for k in 0..n {
                    dot += loadings[i * n + k] * loadings[j * n + k];
                }
                let rho = shrink * dot;
                data[i * n + j] = rho;
                data[j * n + i] = rho;
            }
        }

        CorrelationMatrix::new(&data, n)
    }
}
