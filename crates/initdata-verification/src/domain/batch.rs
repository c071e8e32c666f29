//! # Batch Entities
//!
//! Work items and failure handling for hosts that validate many payloads at
//! once. Items are independent: one item's failure never changes another
//! item's outcome.

use super::entities::{Environment, ValidationOptions, ValidationReport, ValidationRequest};
use super::errors::{ErrorKind, InitDataError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One unit of host input.
///
/// Accepts the host's camelCase parameter names (`initData`, `botId`,
/// `isTestEnvironment`) as well as snake_case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(alias = "init_data")]
    pub init_data: String,
    #[serde(alias = "bot_id")]
    pub bot_id: u64,
    #[serde(default, alias = "is_test_environment")]
    pub is_test_environment: bool,
    /// Per-item max age override in seconds; `0` disables the age check
    #[serde(default, alias = "max_age_secs", skip_serializing_if = "Option::is_none")]
    pub max_age_secs: Option<u64>,
    /// Required only for `hash` (HMAC) verification
    #[serde(default, alias = "bot_token", skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

impl WorkItem {
    pub fn new(init_data: impl Into<String>, bot_id: u64, is_test_environment: bool) -> Self {
        Self {
            init_data: init_data.into(),
            bot_id,
            is_test_environment,
            max_age_secs: None,
            bot_token: None,
        }
    }

    /// Borrow this item as a request, applying its overrides to `defaults`.
    pub fn request(&self, defaults: ValidationOptions) -> ValidationRequest<'_> {
        let mut options = defaults;
        if let Some(secs) = self.max_age_secs {
            options.expiry.max_age = max_age_from_secs(secs);
        }

        ValidationRequest {
            init_data: &self.init_data,
            bot_id: self.bot_id,
            environment: Environment::from_test_flag(self.is_test_environment),
            bot_token: self.bot_token.as_deref(),
            options,
        }
    }
}

/// `0` means "never expires".
pub fn max_age_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// What a batch does when an item fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureMode {
    /// Annotate the failing item and carry on
    #[default]
    #[serde(rename = "continue")]
    ContinueOnFail,
    /// Abort the batch with the first failing item
    #[serde(rename = "stop")]
    StopOnFail,
}

/// Batch aborted in [`FailureMode::StopOnFail`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Item {item_index} failed with {kind}: {message}")]
pub struct BatchError {
    /// Position of the failing item in the input
    pub item_index: usize,
    pub kind: ErrorKind,
    /// Underlying error message
    pub message: String,
}

impl BatchError {
    pub fn new(item_index: usize, error: &InitDataError) -> Self {
        Self {
            item_index,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Error for a failed report; `None` when the report is valid.
    pub fn from_report(item_index: usize, report: &ValidationReport) -> Option<Self> {
        if report.valid {
            return None;
        }
        report.reason.map(|kind| Self {
            item_index,
            kind,
            message: report.message.clone().unwrap_or_default(),
        })
    }
}
