//! Per-path simulation primitives: correlated Gaussian vectors, single-step
//! GBM propagation and basket payoff evaluation.
//!
//! # Drift placement
//!
//! The risk-neutral drift `r - v^2/2` is applied *only* inside the GBM
//! exponent in [`terminal_prices_into`]. The correlated sampler accepts a
//! drift vector for direct use, but the pricing engines always pass zero
//! drift, so the drift term cannot be double-counted.

use crate::rng::SimRng;
use basket_core::matrix::CholeskyFactor;
use num_traits::Float;

/// Draws a fresh correlated Gaussian vector.
///
/// Samples `n` independent standard normals and returns
/// `result[i] = drift[i] + sum_{k <= i} L[i][k] * z[k]`, whose covariance
/// matches the matrix `L` was factorised from. Draws are fresh on every
/// call; nothing is cached.
///
/// # Panics
///
/// Panics if `drift.len() < factor.dim()`.
pub fn correlated_gaussian<T: Float>(
    rng: &mut SimRng,
    drift: &[T],
    factor: &CholeskyFactor<T>,
) -> Vec<T> {
    let n = factor.dim();
    let mut z = vec![T::zero(); n];
    let mut out = vec![T::zero(); n];
    correlated_gaussian_into(rng, drift, factor, &mut z, &mut out);
    out
}

/// Buffer-reusing variant of [`correlated_gaussian`] for the hot loop.
///
/// `z` receives the independent draws, `out` the correlated result; both
/// must hold at least `factor.dim()` elements.
///
/// # Panics
///
/// Panics if any buffer is shorter than `factor.dim()`.
#[inline]
pub fn correlated_gaussian_into<T: Float>(
    rng: &mut SimRng,
    drift: &[T],
    factor: &CholeskyFactor<T>,
    z: &mut [T],
    out: &mut [T],
) {
    let n = factor.dim();
    assert!(drift.len() >= n, "drift vector shorter than dimension {}", n);

    rng.fill_normal(&mut z[..n]);
    factor.transform_into(z, out);
    for i in 0..n {
        out[i] = out[i] + drift[i];
    }
}

/// Advances all asset prices one GBM step to maturity.
///
/// `out[i] = spots[i] * exp((r - vols[i]^2 / 2) * t + sqrt(t) * shocks[i])`
///
/// `shocks` are the correlated standard-normal shocks scaled by the caller
/// (the engines use `vols[i] * w[i]` with `w` drawn from the correlation
/// factor, which equals drawing from the covariance factor directly but
/// stays well-defined when a volatility is zero).
///
/// # Panics
///
/// Panics if the slice lengths disagree.
#[inline]
pub fn terminal_prices_into<T: Float>(
    spots: &[T],
    vols: &[T],
    shocks: &[T],
    maturity: T,
    rate: T,
    out: &mut [T],
) {
    let n = spots.len();
    assert!(
        vols.len() == n && shocks.len() == n && out.len() == n,
        "asset vector lengths disagree"
    );

    let half = T::from(0.5).unwrap_or_else(T::one);
    let sqrt_t = maturity.sqrt();
    for i in 0..n {
        let drift_t = (rate - half * vols[i] * vols[i]) * maturity;
        out[i] = spots[i] * (drift_t + sqrt_t * shocks[i]).exp();
    }
}

/// Discounted European call payoff on the weighted basket level.
///
/// `exp(-r * t) * max(sum_i weights[i] * prices[i] - strike, 0)`
///
/// Pure function, no side effects.
///
/// # Panics
///
/// Panics if `prices.len() != weights.len()`.
#[inline]
pub fn basket_payoff<T: Float>(
    prices: &[T],
    weights: &[T],
    strike: T,
    rate: T,
    maturity: T,
) -> T {
    assert!(
        prices.len() == weights.len(),
        "price and weight vector lengths disagree"
    );

    let mut basket = T::zero();
    for (s, w) in prices.iter().zip(weights.iter()) {
        basket = basket + *s * *w;
    }

    let intrinsic = (basket - strike).max(T::zero());
    (-rate * maturity).exp() * intrinsic
}
