//! # Runtime Configuration
//!
//! Defaults, then `IDG_*` environment variables, then command-line flags.
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `IDG_MAX_AGE_SECS` | `validation.max_age_secs` (`0` disables the age check) |
//! | `IDG_MAX_FUTURE_SKEW_SECS` | `validation.max_future_skew_secs` |
//! | `IDG_SCHEME` | `validation.scheme` (`auto`, `third-party`, `bot-token`) |
//! | `IDG_PRODUCTION_KEY` | `validation.production_key` (64 hex chars) |
//! | `IDG_TEST_KEY` | `validation.test_key` (64 hex chars) |
//! | `IDG_FAILURE_MODE` | `batch.failure_mode` (`continue`, `stop`) |
//! | `IDG_PARALLEL` | `batch.parallel` |
//! | `IDG_MAX_ITEMS` | `batch.max_items` |
//! | `IDG_LOG_LEVEL` | `log_level` |

use initdata_verification::adapters::host::MAX_BATCH_SIZE;
use initdata_verification::domain::batch::max_age_from_secs;
use initdata_verification::{
    ExpiryPolicy, FailureMode, SchemePreference, TrustAnchors, ValidationOptions,
    DEFAULT_MAX_AGE, DEFAULT_MAX_FUTURE_SKEW, TELEGRAM_PRODUCTION_KEY, TELEGRAM_TEST_KEY,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Log levels accepted by `log_level`.
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Validation configuration.
    pub validation: ValidationConfig,
    /// Batch configuration.
    pub batch: BatchConfig,
    /// Default log level; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            batch: BatchConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Validation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum init data age in seconds. `0` disables the check.
    pub max_age_secs: u64,
    /// Tolerated clock skew for `auth_date` in the future.
    pub max_future_skew_secs: u64,
    /// Which signature to verify.
    pub scheme: SchemePreference,
    /// Ed25519 public key for production.
    pub production_key: [u8; 32],
    /// Ed25519 public key for the test environment.
    pub test_key: [u8; 32],
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_MAX_AGE.as_secs(),
            max_future_skew_secs: DEFAULT_MAX_FUTURE_SKEW.as_secs(),
            scheme: SchemePreference::Auto,
            production_key: TELEGRAM_PRODUCTION_KEY,
            test_key: TELEGRAM_TEST_KEY,
        }
    }
}

/// Batch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Continue past failing items or stop at the first one.
    pub failure_mode: FailureMode,
    /// Validate items on the rayon pool.
    pub parallel: bool,
    /// Largest accepted batch.
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::ContinueOnFail,
            parallel: true,
            max_items: MAX_BATCH_SIZE,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting could not be parsed.
    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Unknown log level.
    #[error("Unknown log level {0:?}")]
    UnknownLogLevel(String),

    /// Future skew larger than the whole validity window.
    #[error("max_future_skew_secs ({skew}) exceeds max_age_secs ({max_age})")]
    SkewExceedsMaxAge { skew: u64, max_age: u64 },

    /// Batches must admit at least one item.
    #[error("batch.max_items must be at least 1")]
    EmptyBatchLimit,
}

impl RuntimeConfig {
    /// Defaults with `IDG_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `IDG_*` overrides from `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("IDG_MAX_AGE_SECS") {
            self.validation.max_age_secs = parse_number("IDG_MAX_AGE_SECS", &v)?;
        }
        if let Some(v) = lookup("IDG_MAX_FUTURE_SKEW_SECS") {
            self.validation.max_future_skew_secs = parse_number("IDG_MAX_FUTURE_SKEW_SECS", &v)?;
        }
        if let Some(v) = lookup("IDG_SCHEME") {
            self.validation.scheme = parse_scheme("IDG_SCHEME", &v)?;
        }
        if let Some(v) = lookup("IDG_PRODUCTION_KEY") {
            self.validation.production_key = parse_key("IDG_PRODUCTION_KEY", &v)?;
        }
        if let Some(v) = lookup("IDG_TEST_KEY") {
            self.validation.test_key = parse_key("IDG_TEST_KEY", &v)?;
        }
        if let Some(v) = lookup("IDG_FAILURE_MODE") {
            self.batch.failure_mode = parse_failure_mode("IDG_FAILURE_MODE", &v)?;
        }
        if let Some(v) = lookup("IDG_PARALLEL") {
            self.batch.parallel = parse_bool("IDG_PARALLEL", &v)?;
        }
        if let Some(v) = lookup("IDG_MAX_ITEMS") {
            self.batch.max_items = parse_number("IDG_MAX_ITEMS", &v)?;
        }
        if let Some(v) = lookup("IDG_LOG_LEVEL") {
            self.log_level = v.trim().to_ascii_lowercase();
        }
        Ok(())
    }

    /// Apply command-line overrides; they win over the environment.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(secs) = overrides.max_age_secs {
            self.validation.max_age_secs = secs;
        }
        if let Some(secs) = overrides.max_future_skew_secs {
            self.validation.max_future_skew_secs = secs;
        }
        if let Some(scheme) = &overrides.scheme {
            self.validation.scheme = parse_scheme("--scheme", scheme)?;
        }
        if let Some(mode) = &overrides.failure_mode {
            self.batch.failure_mode = parse_failure_mode("--failure-mode", mode)?;
        }
        if overrides.sequential {
            self.batch.parallel = false;
        }
        if let Some(max) = overrides.max_items {
            self.batch.max_items = max;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.trim().to_ascii_lowercase();
        }
        Ok(())
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }

        let v = &self.validation;
        if v.max_age_secs > 0 && v.max_future_skew_secs > v.max_age_secs {
            return Err(ConfigError::SkewExceedsMaxAge {
                skew: v.max_future_skew_secs,
                max_age: v.max_age_secs,
            });
        }

        if self.batch.max_items == 0 {
            return Err(ConfigError::EmptyBatchLimit);
        }
        Ok(())
    }

    /// Options the service applies to every item.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            scheme: self.validation.scheme,
            expiry: ExpiryPolicy {
                max_age: max_age_from_secs(self.validation.max_age_secs),
                max_future_skew: Duration::from_secs(self.validation.max_future_skew_secs),
            },
        }
    }

    pub fn trust_anchors(&self) -> TrustAnchors {
        TrustAnchors::new(self.validation.production_key, self.validation.test_key)
    }
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_age_secs: Option<u64>,
    pub max_future_skew_secs: Option<u64>,
    pub scheme: Option<String>,
    pub failure_mode: Option<String>,
    pub sequential: bool,
    pub max_items: Option<usize>,
    pub log_level: Option<String>,
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "an unsigned integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "a boolean")),
    }
}

/// Parse a value by its serde name.
fn parse_named<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_ascii_lowercase())).ok()
}

fn parse_scheme(key: &str, value: &str) -> Result<SchemePreference, ConfigError> {
    parse_named(value).ok_or_else(|| invalid(key, value, "auto, third-party or bot-token"))
}

fn parse_failure_mode(key: &str, value: &str) -> Result<FailureMode, ConfigError> {
    parse_named(value).ok_or_else(|| invalid(key, value, "continue or stop"))
}

fn parse_key(key: &str, value: &str) -> Result<[u8; 32], ConfigError> {
    hex::decode(value.trim())
        .ok()
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        .ok_or_else(|| invalid(key, value, "32 bytes of hex"))
}
