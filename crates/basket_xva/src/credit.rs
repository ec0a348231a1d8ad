//! Counterparty credit parameters.

use crate::error::XvaError;

/// Credit parameters of a counterparty under a constant-intensity model.
///
/// Survival follows `S(t) = exp(-hazard_rate * t)`; the marginal default
/// probability over a bucket is the difference of survival probabilities
/// at its endpoints.
///
/// # Examples
///
/// ```
/// use basket_xva::CreditParams;
///
/// let credit = CreditParams::new(0.02, 0.4).unwrap();
/// assert!(credit.marginal_default_prob(0.0, 1.0) > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreditParams {
    /// Annualised default intensity.
    hazard_rate: f64,
    /// Loss given default as a fraction of exposure.
    lgd: f64,
}

impl CreditParams {
    /// Creates validated credit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`XvaError::InvalidCreditParams`] if the hazard rate is
    /// negative or the LGD falls outside `[0, 1]`.
    pub fn new(hazard_rate: f64, lgd: f64) -> Result<Self, XvaError> {
        if hazard_rate < 0.0 || !hazard_rate.is_finite() {
            return Err(XvaError::InvalidCreditParams {
                name: "hazard_rate",
                value: hazard_rate,
            });
        }
        if !(0.0..=1.0).contains(&lgd) {
            return Err(XvaError::InvalidCreditParams {
                name: "lgd",
                value: lgd,
            });
        }
        Ok(Self { hazard_rate, lgd })
    }

    /// Annualised hazard rate.
    #[inline]
    pub fn hazard_rate(&self) -> f64 {
        self.hazard_rate
    }

    /// Loss given default.
    #[inline]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }

    /// Survival probability to time `t` in years.
    #[inline]
    pub fn survival_prob(&self, t: f64) -> f64 {
        (-self.hazard_rate * t).exp()
    }

    /// Probability of default inside `[t1, t2]`.
    ///
    /// Exactly zero when the hazard rate is zero, since both survival
    /// probabilities are then exactly one.
    #[inline]
    pub fn marginal_default_prob(&self, t1: f64, t2: f64) -> f64 {
        self.survival_prob(t1) - self.survival_prob(t2)
    }
}
