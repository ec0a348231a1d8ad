//! # Basket XVA (L3: Application)
//!
//! Credit Valuation Adjustment on top of the Monte Carlo pricing engine.
//!
//! This crate provides:
//! - Counterparty credit parameters (hazard rate, loss given default)
//! - Expected positive exposure profiles along a date schedule
//! - Unilateral CVA as `LGD * sum_i EPE_i * dPD_i`
//!
//! The CVA engine is a thin composition layer: at each exposure date it
//! re-prices the underlying single-name option with its remaining
//! maturity, then weights the resulting exposure by the marginal default
//! probability implied by a constant hazard rate. Dates are priced in
//! parallel with Rayon, each with its own derived seed.
//!
//! ## Example
//!
//! ```
//! use basket_core::types::OptionParams;
//! use basket_pricing::MonteCarloConfig;
//! use basket_xva::{CreditParams, CvaEngine, CvaParameters};
//!
//! let credit = CreditParams::new(0.03, 0.4).unwrap();
//! let option = OptionParams::new(100.0_f64, 100.0, 0.05, 0.2, 1.0).unwrap();
//! let params = CvaParameters::new(credit, option);
//!
//! let config = MonteCarloConfig::builder()
//!     .n_paths(10_000)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let engine = CvaEngine::new(config);
//!
//! let dates = CvaEngine::uniform_schedule(1.0, 10);
//! let result = engine.compute(&params, &dates).unwrap();
//! assert!(result.cva > 0.0);
//! ```

pub mod credit;
pub mod cva;
pub mod error;

pub use credit::CreditParams;
pub use cva::{CvaEngine, CvaParameters, CvaResult, ExposureProfile, CVA_DEFAULT_PATHS};
pub use error::XvaError;
