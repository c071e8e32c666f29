//! # Batch Runner
//!
//! Turns a JSON document of work items into JSON reports using the configured
//! service and host adapter.

use crate::config::RuntimeConfig;
use initdata_verification::{
    Clock, HostAdapter, HostError, InitDataValidationService, ValidationReport,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Runner errors.
#[derive(Debug, Error)]
pub enum RunError {
    /// Input is not JSON
    #[error("Input is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Input is JSON but neither an object nor an array of objects
    #[error("Input must be a work item object or an array of them")]
    UnexpectedShape,

    /// Batch too large or a stop-on-fail batch aborted
    #[error(transparent)]
    Host(#[from] HostError),
}

impl RunError {
    /// Whether a stop-on-fail batch aborted on an invalid item.
    pub fn is_abort(&self) -> bool {
        matches!(self, RunError::Host(HostError::Validation(_)))
    }
}

/// Build the host adapter described by `config`.
pub fn build_adapter<C: Clock>(
    config: &RuntimeConfig,
    clock: C,
) -> HostAdapter<InitDataValidationService<C>> {
    let service = InitDataValidationService::new(clock)
        .with_anchors(config.trust_anchors())
        .with_defaults(config.validation_options())
        .with_parallelism(config.batch.parallel);

    HostAdapter::new(service, config.batch.failure_mode).with_max_batch_size(config.batch.max_items)
}

/// Validate every work item in `input`.
///
/// A single object is treated as a batch of one.
pub fn run_batch<C: Clock>(
    config: &RuntimeConfig,
    clock: C,
    input: &str,
) -> Result<Vec<ValidationReport>, RunError> {
    let params = match serde_json::from_str(input)? {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => return Err(RunError::UnexpectedShape),
    };
    debug!(items = params.len(), "Input parsed");

    Ok(build_adapter(config, clock).execute(params)?)
}
