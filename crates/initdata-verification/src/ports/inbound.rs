//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this crate.

use crate::domain::batch::{BatchError, FailureMode, WorkItem};
use crate::domain::entities::{ValidationOutcome, ValidationReport, ValidationRequest};
use crate::domain::errors::InitDataError;
use crate::domain::init_data::InitData;

/// Primary init data validation API.
///
/// Implementations must be thread-safe (`Send + Sync`) and stateless across
/// calls.
pub trait InitDataValidationApi: Send + Sync {
    /// Validate one payload.
    fn validate(&self, request: &ValidationRequest<'_>) -> ValidationOutcome;

    /// Validate one payload and return its typed view.
    fn validate_and_parse(&self, request: &ValidationRequest<'_>) -> Result<InitData, InitDataError>;

    /// Validate a batch of independent items.
    ///
    /// # Errors
    /// * `BatchError` - only in `FailureMode::StopOnFail`, for the failing item
    ///   with the lowest index
    fn validate_batch(
        &self,
        items: &[WorkItem],
        mode: FailureMode,
    ) -> Result<Vec<ValidationReport>, BatchError>;
}
