//! Authentication configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth.verification_cache]
//! enabled = true
//! ttl = "60s"
//! sweep_interval = "60s"
//! offload = true
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a memoized verification outcome.
pub const DEFAULT_VERIFICATION_TTL: Duration = Duration::from_secs(60);

/// Default period of the background sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for the cache TTL and the sweep interval.
pub const MAX_CACHE_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Root authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Verification cache configuration.
    pub verification_cache: VerificationCacheConfig,
}

/// Verification cache configuration.
///
/// Controls how long password verification outcomes are memoized and how
/// often expired entries are swept.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationCacheConfig {
    /// Memoize outcomes. When disabled every verification runs the slow
    /// comparison and nothing is stored.
    pub enabled: bool,

    /// How long an outcome may be served after it was computed.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Period of the background sweep that drops expired entries.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,

    /// Run the slow comparison on Tokio's blocking pool instead of the
    /// calling task.
    pub offload: bool,
}

impl Default for VerificationCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_VERIFICATION_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            offload: true,
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the cache TTL or the sweep
    /// interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification_cache.validate()
    }
}

impl VerificationCacheConfig {
    /// Validates the cache settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a duration is zero or longer
    /// than [`MAX_CACHE_DURATION`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_duration("verification_cache.ttl", self.ttl)?;
        check_duration("verification_cache.sweep_interval", self.sweep_interval)
    }
}

fn check_duration(name: &str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::InvalidValue(format!("{name} must be > 0")));
    }

    if value > MAX_CACHE_DURATION {
        return Err(ConfigError::InvalidValue(format!(
            "{name} must be <= {}s",
            MAX_CACHE_DURATION.as_secs()
        )));
    }

    Ok(())
}
