//! # Host Batch Adapter
//!
//! Boundary between a host that hands over loosely typed parameter objects
//! (one JSON object per work item) and the typed validation API.
//!
//! ## Conventions
//!
//! - Parameters are extracted per item. A missing or mistyped `initData`
//!   fails that item with `MalformedPayload`; any other bad parameter fails
//!   it with `InvalidSigningContext`. Other items are unaffected.
//! - `ContinueOnFail` yields one report per item, in input order.
//! - `StopOnFail` surfaces the lowest failing index with its error, whether
//!   the item failed extraction or validation.

use crate::domain::batch::{BatchError, FailureMode, WorkItem};
use crate::domain::entities::ValidationReport;
use crate::domain::errors::InitDataError;
use crate::ports::inbound::InitDataValidationApi;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default upper bound on items per batch.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Host boundary errors.
#[derive(Debug, Error)]
pub enum HostError {
    /// Batch too large
    #[error("Batch size {size} exceeds maximum {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// A stop-on-fail batch aborted
    #[error("Validation aborted: {0}")]
    Validation(#[from] BatchError),
}

impl HostError {
    /// Index of the offending item, if the error concerns one.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Self::Validation(e) => Some(e.item_index),
            Self::BatchTooLarge { .. } => None,
        }
    }
}

/// The payload parameter alone, so its absence is told apart from the rest.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadParam {
    #[serde(alias = "init_data")]
    #[allow(dead_code)]
    init_data: String,
}

/// Extract one work item from a host parameter object.
pub fn extract_item(value: Value) -> Result<WorkItem, InitDataError> {
    PayloadParam::deserialize(&value).map_err(|e| InitDataError::InvalidField {
        field: "initData".to_string(),
        detail: e.to_string(),
    })?;
    WorkItem::deserialize(value).map_err(|e| InitDataError::InvalidSigningContext(e.to_string()))
}

/// Runs host batches against a validation service.
pub struct HostAdapter<S: InitDataValidationApi> {
    service: S,
    mode: FailureMode,
    max_batch_size: usize,
}

impl<S: InitDataValidationApi> HostAdapter<S> {
    pub fn new(service: S, mode: FailureMode) -> Self {
        Self {
            service,
            mode,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    pub fn mode(&self) -> FailureMode {
        self.mode
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn check_size(&self, size: usize) -> Result<(), HostError> {
        if size > self.max_batch_size {
            return Err(HostError::BatchTooLarge {
                size,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// Extract typed work items from host parameter objects, one result per
    /// object.
    pub fn extract(
        &self,
        params: Vec<Value>,
    ) -> Result<Vec<Result<WorkItem, InitDataError>>, HostError> {
        self.check_size(params.len())?;
        Ok(params.into_iter().map(extract_item).collect())
    }

    /// Validate already-typed items.
    pub fn run(&self, items: &[WorkItem]) -> Result<Vec<ValidationReport>, HostError> {
        self.check_size(items.len())?;
        let reports = self.service.validate_batch(items, FailureMode::ContinueOnFail)?;
        self.finish(reports)
    }

    /// Extract and validate host parameter objects.
    pub fn execute(&self, params: Vec<Value>) -> Result<Vec<ValidationReport>, HostError> {
        let extracted = self.extract(params)?;

        let mut reports: Vec<Option<ValidationReport>> = vec![None; extracted.len()];
        let mut positions = Vec::with_capacity(extracted.len());
        let mut items = Vec::with_capacity(extracted.len());
        for (index, entry) in extracted.into_iter().enumerate() {
            match entry {
                Ok(item) => {
                    positions.push(index);
                    items.push(item);
                }
                Err(e) => {
                    debug!(item_index = index, reason = %e.kind(), error = %e, "Invalid item parameters");
                    reports[index] = Some(ValidationReport::invalid(&e));
                }
            }
        }

        let validated = self.service.validate_batch(&items, FailureMode::ContinueOnFail)?;
        for (index, report) in positions.into_iter().zip(validated) {
            reports[index] = Some(report);
        }

        self.finish(reports.into_iter().flatten().collect())
    }

    /// Apply the failure mode to a complete, ordered set of reports.
    fn finish(&self, reports: Vec<ValidationReport>) -> Result<Vec<ValidationReport>, HostError> {
        if self.mode == FailureMode::StopOnFail {
            let first_failure = reports
                .iter()
                .enumerate()
                .find_map(|(index, report)| BatchError::from_report(index, report));
            if let Some(e) = first_failure {
                warn!(item_index = e.item_index, reason = %e.kind, "Batch aborted");
                return Err(e.into());
            }
        }

        let invalid = reports.iter().filter(|r| !r.valid).count();
        info!(items = reports.len(), invalid, mode = ?self.mode, "Batch complete");
        Ok(reports)
    }
}
