//! Option contract definitions and pricing results.

use super::{Asset, MarketDataError};
use crate::matrix::CorrelationMatrix;
use num_traits::Float;

/// A European call on a weighted basket of correlated underlyings.
///
/// The basket dimension is carried at runtime; all boundaries validate it
/// against the correlation matrix and asset vector.
///
/// # Examples
///
/// ```
/// use basket_core::types::{Asset, BasketOption};
/// use basket_core::matrix::CorrelationMatrix;
///
/// let assets = vec![
///     Asset::new(100.0_f64, 0.2, 0.5).unwrap(),
///     Asset::new(95.0, 0.25, 0.5).unwrap(),
/// ];
/// let corr = CorrelationMatrix::new(&[1.0, 0.3, 0.3, 1.0], 2).unwrap();
/// let option = BasketOption::new(assets, corr, 100.0, 1.0, 0.05).unwrap();
/// assert_eq!(option.dim(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasketOption<T: Float> {
    /// Underlyings, one per basket component.
    assets: Vec<Asset<T>>,
    /// Correlation between the underlyings' Brownian drivers.
    correlation: CorrelationMatrix<T>,
    /// Basket strike (K).
    pub strike: T,
    /// Time to maturity in years (T).
    pub maturity: T,
    /// Risk-free rate (r), annualised.
    pub rate: T,
}

impl<T: Float> BasketOption<T> {
    /// Creates a validated basket option.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] if the basket is empty, the correlation
    /// matrix dimension disagrees with the asset count, the maturity is not
    /// strictly positive, or any asset fails validation.
    pub fn new(
        assets: Vec<Asset<T>>,
        correlation: CorrelationMatrix<T>,
        strike: T,
        maturity: T,
        rate: T,
    ) -> Result<Self, MarketDataError> {
        if assets.is_empty() {
            return Err(MarketDataError::EmptyBasket);
        }
        if correlation.dim() != assets.len() {
            return Err(MarketDataError::DimensionMismatch {
                expected: assets.len(),
                got: correlation.dim(),
            });
        }
        if maturity <= T::zero() || !maturity.is_finite() {
            return Err(MarketDataError::InvalidMaturity(
                maturity.to_f64().unwrap_or(f64::NAN),
            ));
        }
        for asset in &assets {
            asset.validate()?;
        }

        Ok(Self {
            assets,
            correlation,
            strike,
            maturity,
            rate,
        })
    }

    /// Number of underlyings in the basket.
    #[inline]
    pub fn dim(&self) -> usize {
        self.assets.len()
    }

    /// Underlyings of the basket.
    #[inline]
    pub fn assets(&self) -> &[Asset<T>] {
        &self.assets
    }

    /// Correlation matrix of the Brownian drivers.
    #[inline]
    pub fn correlation(&self) -> &CorrelationMatrix<T> {
        &self.correlation
    }

    /// Spot prices of all underlyings, in basket order.
    pub fn spots(&self) -> Vec<T> {
        self.assets.iter().map(|a| a.spot).collect()
    }

    /// Volatilities of all underlyings, in basket order.
    pub fn volatilities(&self) -> Vec<T> {
        self.assets.iter().map(|a| a.volatility).collect()
    }

    /// Basket weights of all underlyings, in basket order.
    pub fn weights(&self) -> Vec<T> {
        self.assets.iter().map(|a| a.weight).collect()
    }

    /// Drift terms of all underlyings, in basket order.
    pub fn drifts(&self) -> Vec<T> {
        self.assets.iter().map(|a| a.drift).collect()
    }
}

/// Parameters of a single-name European option.
///
/// Used by the CVA engine, which re-prices one option along an exposure
/// schedule, and by the closed-form Black-Scholes reference.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionParams<T: Float> {
    /// Spot price.
    pub spot: T,
    /// Strike price.
    pub strike: T,
    /// Risk-free rate, annualised.
    pub rate: T,
    /// Annualised volatility.
    pub volatility: T,
    /// Time to maturity in years.
    pub maturity: T,
}

impl<T: Float> OptionParams<T> {
    /// Creates validated single-name option parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] if `spot <= 0`, `volatility < 0`,
    /// or `maturity <= 0`.
    pub fn new(
        spot: T,
        strike: T,
        rate: T,
        volatility: T,
        maturity: T,
    ) -> Result<Self, MarketDataError> {
        if spot <= T::zero() || !spot.is_finite() {
            return Err(MarketDataError::InvalidSpot(
                spot.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if volatility < T::zero() || !volatility.is_finite() {
            return Err(MarketDataError::InvalidVolatility(
                volatility.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if maturity <= T::zero() || !maturity.is_finite() {
            return Err(MarketDataError::InvalidMaturity(
                maturity.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self {
            spot,
            strike,
            rate,
            volatility,
            maturity,
        })
    }

    /// Converts the option into a one-asset basket with weight 1.
    ///
    /// The basket engine degenerates to standard single-asset GBM pricing,
    /// which is how the CVA exposure schedule is evaluated.
    pub fn to_basket(&self) -> BasketOption<T> {
        let asset = Asset {
            spot: self.spot,
            volatility: self.volatility,
            weight: T::one(),
            drift: T::zero(),
        };
        // A 1x1 identity correlation and validated fields cannot fail.
        BasketOption::new(
            vec![asset],
            CorrelationMatrix::identity(1),
            self.strike,
            self.maturity,
            self.rate,
        )
        .expect("validated single-name parameters form a valid basket")
    }
}

/// Result of one completed Monte Carlo pricing batch.
///
/// Immutable after creation: the engine produces exactly one `OptionValue`
/// per batch of simulated paths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionValue {
    /// Sample mean of the discounted payoff.
    pub expected: f64,
    /// Half-width of the 95% confidence interval around the mean.
    pub confidence: f64,
}

impl OptionValue {
    /// Creates a new pricing result.
    #[inline]
    pub fn new(expected: f64, confidence: f64) -> Self {
        Self {
            expected,
            confidence,
        }
    }

    /// Lower bound of the 95% confidence interval.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.expected - self.confidence
    }

    /// Upper bound of the 95% confidence interval.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.expected + self.confidence
    }
}
