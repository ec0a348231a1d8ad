//! Single-underlying market data.

use super::MarketDataError;
use num_traits::Float;

/// Market data for one underlying in a basket.
///
/// # Invariants
///
/// - `spot > 0`
/// - `volatility >= 0`
///
/// The drift is the risk-neutral drift *before* the Ito compensation term;
/// the simulation applies `r - v^2/2` itself, so a plain risk-neutral setup
/// uses `drift = 0`.
///
/// # Examples
///
/// ```
/// use basket_core::types::Asset;
///
/// let asset = Asset::new(100.0_f64, 0.2, 1.0 / 3.0).unwrap();
/// assert_eq!(asset.spot, 100.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asset<T: Float> {
    /// Spot price (S0).
    pub spot: T,
    /// Annualised volatility (sigma).
    pub volatility: T,
    /// Portfolio weight in the basket level.
    pub weight: T,
    /// Additional drift applied to the correlated shocks (usually zero).
    pub drift: T,
}

impl<T: Float> Asset<T> {
    /// Creates a validated asset with zero drift.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] if `spot <= 0` or `volatility < 0`.
    pub fn new(spot: T, volatility: T, weight: T) -> Result<Self, MarketDataError> {
        let asset = Self {
            spot,
            volatility,
            weight,
            drift: T::zero(),
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Creates a validated asset with an explicit drift term.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] if `spot <= 0` or `volatility < 0`.
    pub fn with_drift(
        spot: T,
        volatility: T,
        weight: T,
        drift: T,
    ) -> Result<Self, MarketDataError> {
        let asset = Self {
            spot,
            volatility,
            weight,
            drift,
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Validates the asset invariants.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.spot <= T::zero() || !self.spot.is_finite() {
            return Err(MarketDataError::InvalidSpot(
                self.spot.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if self.volatility < T::zero() || !self.volatility.is_finite() {
            return Err(MarketDataError::InvalidVolatility(
                self.volatility.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_valid() {
        let asset = Asset::new(100.0_f64, 0.2, 0.5).unwrap();
        assert_eq!(asset.drift, 0.0);
        assert_eq!(asset.weight, 0.5);
    }

    #[test]
    fn test_asset_negative_spot() {
        let result = Asset::new(-1.0_f64, 0.2, 0.5);
        assert!(matches!(result, Err(MarketDataError::InvalidSpot(_))));
    }

    #[test]
    fn test_asset_zero_spot() {
        let result = Asset::new(0.0_f64, 0.2, 0.5);
        assert!(matches!(result, Err(MarketDataError::InvalidSpot(_))));
    }

    #[test]
    fn test_asset_negative_volatility() {
        let result = Asset::new(100.0_f64, -0.1, 0.5);
        assert!(matches!(result, Err(MarketDataError::InvalidVolatility(_))));
    }

    #[test]
    fn test_asset_zero_volatility_allowed() {
        assert!(Asset::new(100.0_f64, 0.0, 0.5).is_ok());
    }

    #[test]
    fn test_asset_f32() {
        let asset = Asset::with_drift(50.0_f32, 0.3, 1.0, 0.01).unwrap();
        assert_eq!(asset.drift, 0.01);
    }
}
