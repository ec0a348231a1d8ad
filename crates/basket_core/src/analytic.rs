//! Closed-form Black-Scholes reference pricing.
//!
//! Used to validate that the Monte Carlo engines degenerate correctly to
//! the single-asset case, and by the CVA engine's sanity checks. Generic
//! over `T: Float` so it serves both precision modes.

use num_traits::Float;

/// Abramowitz & Stegun 7.1.26 complementary error function approximation.
///
/// Maximum absolute error 1.5e-7 over the real line.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let one = T::one();
    let abs_x = x.abs();

    let a1 = T::from(0.254829592).unwrap_or_else(T::zero);
    let a2 = T::from(-0.284496736).unwrap_or_else(T::zero);
    let a3 = T::from(1.421413741).unwrap_or_else(T::zero);
    let a4 = T::from(-1.453152027).unwrap_or_else(T::zero);
    let a5 = T::from(1.061405429).unwrap_or_else(T::zero);
    let p = T::from(0.3275911).unwrap_or_else(T::zero);

    let t = one / (one + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < T::zero() {
        T::from(2.0).unwrap_or(one) - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// `Phi(x) = erfc(-x / sqrt(2)) / 2`, accurate to about 1e-7.
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let sqrt_2 = T::from(std::f64::consts::SQRT_2).unwrap_or_else(T::one);
    let half = T::from(0.5).unwrap_or_else(T::one);
    half * erfc_approx(-x / sqrt_2)
}

/// Black-Scholes price of a European call.
///
/// `C = S * Phi(d1) - K * exp(-r*T) * Phi(d2)` with
/// `d1 = (ln(S/K) + (r + v^2/2) T) / (v sqrt(T))` and `d2 = d1 - v sqrt(T)`.
///
/// A zero volatility (or zero maturity) degenerates to the discounted
/// intrinsic value on the forward.
///
/// # Examples
///
/// ```
/// use basket_core::analytic::black_scholes_call;
///
/// let price = black_scholes_call(100.0_f64, 100.0, 0.05, 0.2, 1.0);
/// assert!((price - 10.4506).abs() < 1e-3);
/// ```
pub fn black_scholes_call<T: Float>(spot: T, strike: T, rate: T, volatility: T, maturity: T) -> T {
    let discount = (-rate * maturity).exp();

    let vol_sqrt_t = volatility * maturity.sqrt();
    if vol_sqrt_t <= T::zero() {
        return (spot - strike * discount).max(T::zero());
    }

    let half = T::from(0.5).unwrap_or_else(T::one);
    let d1 = ((spot / strike).ln() + (rate + half * volatility * volatility) * maturity)
        / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    spot * norm_cdf(d1) - strike * discount * norm_cdf(d2)
}
