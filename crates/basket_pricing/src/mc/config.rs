//! Monte Carlo simulation configuration.
//!
//! Replaces the tunables a build system would bake in (path counts, thread
//! counts, seeds) with an explicit validated configuration structure.

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Default number of simulation paths (the full pricing profile; the CVA
/// engine uses a lighter per-date default of its own).
pub const DEFAULT_PATHS: usize = 200_000;

/// Monte Carlo simulation configuration.
///
/// Immutable once built. Use [`MonteCarloConfig::builder`].
///
/// # Examples
///
/// ```
/// use basket_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(50_000)
///     .n_threads(4)
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(config.n_paths(), 50_000);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloConfig {
    /// Number of simulation paths.
    n_paths: usize,
    /// Number of CPU worker threads.
    n_threads: usize,
    /// Optional seed for reproducibility.
    seed: Option<u64>,
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of CPU worker threads.
    #[inline]
    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Seed for reproducibility, if set.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n_paths` is 0 or above [`MAX_PATHS`],
    /// or `n_threads` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.n_threads == 0 {
            return Err(ConfigError::InvalidThreadCount(self.n_threads));
        }
        Ok(())
    }
}

impl Default for MonteCarloConfig {
    /// Default profile: [`DEFAULT_PATHS`] paths over all available cores,
    /// unseeded.
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            n_threads: num_cpus::get().max(1),
            seed: None,
        }
    }
}

/// Builder for [`MonteCarloConfig`].
///
/// Unset fields fall back to the documented defaults: [`DEFAULT_PATHS`]
/// paths, one worker per available core, no seed.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    n_threads: Option<usize>,
    seed: Option<u64>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulation paths (in `[1, MAX_PATHS]`).
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of CPU worker threads.
    #[inline]
    pub fn n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = Some(n_threads);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a provided value is out of range.
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let config = MonteCarloConfig {
            n_paths: self.n_paths.unwrap_or(DEFAULT_PATHS),
            n_threads: self.n_threads.unwrap_or_else(|| num_cpus::get().max(1)),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
