//! Credit Valuation Adjustment engine.
//!
//! CVA is the expected loss from counterparty default:
//!
//! CVA = LGD * sum_i EPE_i * dPD_i
//!
//! where `EPE_i` is the expected positive exposure at date `t_i`, obtained
//! by re-pricing the option with its remaining maturity, and `dPD_i` is the
//! marginal default probability over `(t_{i-1}, t_i]` under a constant
//! hazard rate.

use basket_core::types::OptionParams;
use basket_pricing::{BasketPricer, MonteCarloConfig, PricingError};
use num_traits::Float;
use rayon::prelude::*;
use tracing::debug;

use crate::credit::CreditParams;
use crate::error::XvaError;

/// Seed stride between exposure dates, so each date prices on an
/// independent stream while the whole profile stays reproducible.
const DATE_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Default path count for each exposure-date re-pricing.
///
/// Lighter than the full pricing profile: a CVA run prices the option once
/// per schedule date, so path budget is spent across the whole grid.
pub const CVA_DEFAULT_PATHS: usize = 10_000;

/// Inputs to a CVA calculation: the counterparty and the exposed option.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvaParameters<T: Float> {
    /// Counterparty credit parameters.
    pub credit: CreditParams,
    /// Single-name option whose exposure is re-priced along the schedule.
    pub option: OptionParams<T>,
}

impl<T: Float> CvaParameters<T> {
    /// Bundles credit parameters with the exposed option.
    #[inline]
    pub fn new(credit: CreditParams, option: OptionParams<T>) -> Self {
        Self { credit, option }
    }
}

/// Expected positive exposure along a date schedule.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExposureProfile {
    /// Exposure dates in years, strictly increasing.
    pub dates: Vec<f64>,
    /// Expected positive exposure at each date.
    pub epe: Vec<f64>,
}

/// Result of a completed CVA calculation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvaResult {
    /// The CVA figure, always non-negative.
    pub cva: f64,
    /// The exposure profile the figure was aggregated from.
    pub profile: ExposureProfile,
}

/// Computes CVA by re-pricing an option along an exposure schedule.
///
/// Dates are priced in parallel; each date derives its own seed from the
/// configured base seed, so results are reproducible for a fixed
/// configuration.
#[derive(Clone, Debug)]
pub struct CvaEngine {
    config: MonteCarloConfig,
}

impl Default for CvaEngine {
    /// An engine with the per-date profile of [`CVA_DEFAULT_PATHS`] paths
    /// and default threading; prices are not seeded, so runs differ.
    fn default() -> Self {
        let config = MonteCarloConfig::builder()
            .n_paths(CVA_DEFAULT_PATHS)
            .build()
            .expect("default per-date configuration is valid");
        Self { config }
    }
}

impl CvaEngine {
    /// Creates an engine that prices each exposure date with `config`.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// The per-date Monte Carlo configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// An evenly spaced schedule of `m` dates over `(0, maturity]`.
    pub fn uniform_schedule(maturity: f64, m: usize) -> Vec<f64> {
        let step = maturity / m as f64;
        (1..=m).map(|i| i as f64 * step).collect()
    }

    /// Computes the expected positive exposure profile for `option`.
    ///
    /// Each date `t_i` re-prices the option with remaining maturity
    /// `T - t_i`. Dates at or past maturity contribute zero exposure, since
    /// the trade has expired.
    ///
    /// # Errors
    ///
    /// Returns [`XvaError::EmptySchedule`] or [`XvaError::InvalidSchedule`]
    /// for a malformed date grid, and [`XvaError::Pricing`] if the
    /// underlying Monte Carlo run fails.
    pub fn exposure_profile<T>(
        &self,
        option: &OptionParams<T>,
        dates: &[f64],
    ) -> Result<ExposureProfile, XvaError>
    where
        T: Float + Send + Sync,
    {
        validate_schedule(dates)?;

        let maturity = option.maturity.to_f64().unwrap_or(f64::NAN);
        let epe: Vec<f64> = dates
            .par_iter()
            .enumerate()
            .map(|(i, &date)| self.exposure_at(option, maturity, date, i))
            .collect::<Result<_, PricingError>>()?;

        debug!(
            n_dates = dates.len(),
            peak = epe.iter().cloned().fold(0.0_f64, f64::max),
            "exposure profile computed"
        );

        Ok(ExposureProfile {
            dates: dates.to_vec(),
            epe,
        })
    }

    /// Computes CVA from parameters and an exposure schedule.
    ///
    /// With a zero hazard rate every marginal default probability is
    /// exactly zero, so the result is exactly zero regardless of exposure.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CvaEngine::exposure_profile`].
    pub fn compute<T>(
        &self,
        params: &CvaParameters<T>,
        dates: &[f64],
    ) -> Result<CvaResult, XvaError>
    where
        T: Float + Send + Sync,
    {
        let profile = self.exposure_profile(&params.option, dates)?;
        let cva = Self::aggregate(&params.credit, &profile);
        debug!(cva, n_dates = dates.len(), "cva aggregated");
        Ok(CvaResult { cva, profile })
    }

    /// Folds an exposure profile and credit curve into the CVA figure.
    pub fn aggregate(credit: &CreditParams, profile: &ExposureProfile) -> f64 {
        let mut cva = 0.0;
        let mut prev = 0.0;
        for (&date, &epe) in profile.dates.iter().zip(&profile.epe) {
            cva += credit.lgd() * epe * credit.marginal_default_prob(prev, date);
            prev = date;
        }
        cva.max(0.0)
    }

    fn exposure_at<T>(
        &self,
        option: &OptionParams<T>,
        maturity: f64,
        date: f64,
        index: usize,
    ) -> Result<f64, PricingError>
    where
        T: Float + Send + Sync,
    {
        let remaining = maturity - date;
        if remaining <= 0.0 {
            return Ok(0.0);
        }

        let dated = OptionParams {
            maturity: T::from(remaining).unwrap_or_else(T::zero),
            ..*option
        };
        let pricer = BasketPricer::new(self.date_config(index)?);
        let run = pricer.price_single(&dated)?;
        Ok(run.value.expected)
    }

    // One validated config per date, with the seed shifted onto its own
    // stream. Re-validation of an already valid config cannot fail.
    fn date_config(&self, index: usize) -> Result<MonteCarloConfig, PricingError> {
        let mut builder = MonteCarloConfig::builder()
            .n_paths(self.config.n_paths())
            .n_threads(self.config.n_threads());
        if let Some(seed) = self.config.seed() {
            builder = builder
                .seed(seed.wrapping_add((index as u64 + 1).wrapping_mul(DATE_SEED_STRIDE)));
        }
        Ok(builder.build()?)
    }
}

fn validate_schedule(dates: &[f64]) -> Result<(), XvaError> {
    if dates.is_empty() {
        return Err(XvaError::EmptySchedule);
    }
    let mut prev = 0.0;
    for (index, &value) in dates.iter().enumerate() {
        if !(value > prev) || !value.is_finite() {
            return Err(XvaError::InvalidSchedule { index, value });
        }
        prev = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_option() -> OptionParams<f64> {
        OptionParams::new(100.0, 100.0, 0.05, 0.2, 1.0).unwrap()
    }

    fn test_config(n_paths: usize) -> MonteCarloConfig {
        MonteCarloConfig::builder()
            .n_paths(n_paths)
            .seed(1234)
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_engine_uses_per_date_profile() {
        let engine = CvaEngine::default();
        assert_eq!(engine.config().n_paths(), CVA_DEFAULT_PATHS);
        assert_eq!(engine.config().seed(), None);

        let credit = CreditParams::new(0.02, 0.4).unwrap();
        let params = CvaParameters::new(credit, test_option());
        let dates = CvaEngine::uniform_schedule(1.0, 4);
        let result = engine.compute(&params, &dates).unwrap();
        assert!(result.cva > 0.0);
    }

    #[test]
    fn test_uniform_schedule() {
        let dates = CvaEngine::uniform_schedule(1.0, 4);
        assert_eq!(dates, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_schedule_validation() {
        assert!(matches!(
            validate_schedule(&[]),
            Err(XvaError::EmptySchedule)
        ));
        assert!(matches!(
            validate_schedule(&[0.5, 0.5]),
            Err(XvaError::InvalidSchedule { index: 1, .. })
        ));
        assert!(matches!(
            validate_schedule(&[-0.1]),
            Err(XvaError::InvalidSchedule { index: 0, .. })
        ));
        assert!(validate_schedule(&[0.25, 0.5, 1.0]).is_ok());
    }

    #[test]
    fn test_zero_hazard_cva_is_exactly_zero() {
        let credit = CreditParams::new(0.0, 0.4).unwrap();
        let params = CvaParameters::new(credit, test_option());
        let engine = CvaEngine::new(test_config(2_000));

        let dates = CvaEngine::uniform_schedule(1.0, 5);
        let result = engine.compute(&params, &dates).unwrap();

        assert_eq!(result.cva, 0.0);
        // Exposure itself is still positive for an at-the-money option.
        assert!(result.profile.epe[0] > 0.0);
    }

    #[test]
    fn test_positive_cva_for_risky_counterparty() {
        let credit = CreditParams::new(0.05, 0.4).unwrap();
        let params = CvaParameters::new(credit, test_option());
        let engine = CvaEngine::new(test_config(10_000));

        let dates = CvaEngine::uniform_schedule(1.0, 8);
        let result = engine.compute(&params, &dates).unwrap();

        assert!(result.cva > 0.0);
        // CVA is bounded by LGD times the peak exposure.
        let peak = result.profile.epe.iter().cloned().fold(0.0_f64, f64::max);
        assert!(result.cva <= 0.4 * peak);
    }

    #[test]
    fn test_cva_scales_with_lgd() {
        let option = test_option();
        let engine = CvaEngine::new(test_config(10_000));
        let dates = CvaEngine::uniform_schedule(1.0, 5);

        let profile = engine.exposure_profile(&option, &dates).unwrap();
        let low = CvaEngine::aggregate(&CreditParams::new(0.05, 0.2).unwrap(), &profile);
        let high = CvaEngine::aggregate(&CreditParams::new(0.05, 0.6).unwrap(), &profile);

        assert_relative_eq!(high, 3.0 * low, epsilon = 1e-12);
    }

    #[test]
    fn test_exposure_zero_at_maturity() {
        let engine = CvaEngine::new(test_config(2_000));
        let profile = engine
            .exposure_profile(&test_option(), &[0.5, 1.0, 1.5])
            .unwrap();
        // The last two dates are at or past expiry.
        assert!(profile.epe[0] > 0.0);
        assert_eq!(profile.epe[1], 0.0);
        assert_eq!(profile.epe[2], 0.0);
    }

    #[test]
    fn test_profile_reproducible_for_fixed_seed() {
        let engine = CvaEngine::new(test_config(5_000));
        let dates = CvaEngine::uniform_schedule(1.0, 4);
        let a = engine.exposure_profile(&test_option(), &dates).unwrap();
        let b = engine.exposure_profile(&test_option(), &dates).unwrap();
        assert_eq!(a, b);
    }
}
