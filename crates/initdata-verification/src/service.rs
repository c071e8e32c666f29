//! # Init Data Validation Service
//!
//! Application service layer that implements the `InitDataValidationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`InitDataValidationApi`)
//! - Reads the time through the outbound port (`Clock`)
//! - Delegates parsing and cryptography to the domain layer

use crate::domain::batch::{BatchError, FailureMode, WorkItem};
use crate::domain::entities::{
    FieldSet, ValidationOptions, ValidationOutcome, ValidationReport, ValidationRequest,
};
use crate::domain::errors::{ErrorKind, InitDataError};
use crate::domain::init_data::InitData;
use crate::domain::keys::TrustAnchors;
use crate::domain::verifier::validate_request;
use crate::ports::inbound::InitDataValidationApi;
use crate::ports::outbound::{Clock, SystemClock};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Init data validation service.
///
/// Holds only immutable configuration; every call builds and drops its own
/// field set and signing context.
#[derive(Clone, Debug)]
pub struct InitDataValidationService<C: Clock = SystemClock> {
    clock: C,
    anchors: TrustAnchors,
    defaults: ValidationOptions,
    parallel: bool,
}

impl InitDataValidationService<SystemClock> {
    /// Service with the wall clock, Telegram's keys and default options.
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> InitDataValidationService<C> {
    /// Create a new validation service.
    ///
    /// # Arguments
    /// * `clock` - Source of the current time for freshness checks
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            anchors: TrustAnchors::default(),
            defaults: ValidationOptions::default(),
            parallel: true,
        }
    }

    /// Replace the Ed25519 trust anchors.
    pub fn with_anchors(mut self, anchors: TrustAnchors) -> Self {
        self.anchors = anchors;
        self
    }

    /// Options applied to batch items (per-item overrides still win).
    pub fn with_defaults(mut self, defaults: ValidationOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether batches run on the rayon pool.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn defaults(&self) -> &ValidationOptions {
        &self.defaults
    }

    pub fn anchors(&self) -> &TrustAnchors {
        &self.anchors
    }

    fn run(&self, request: &ValidationRequest<'_>) -> Result<FieldSet, InitDataError> {
        let now = self.clock.now_unix();
        let result = validate_request(request, &self.anchors, now);

        match &result {
            Ok(_) => debug!(bot_id = request.bot_id, "Init data accepted"),
            Err(e) if e.kind() == ErrorKind::SignatureMismatch => warn!(
                bot_id = request.bot_id,
                environment = ?request.environment,
                reason = %e.kind(),
                "Init data rejected"
            ),
            Err(e) => debug!(
                bot_id = request.bot_id,
                reason = %e.kind(),
                error = %e,
                "Init data rejected"
            ),
        }
        result
    }

    fn validate_item(&self, item: &WorkItem) -> ValidationOutcome {
        let request = item.request(self.defaults);
        self.validate(&request)
    }
}

impl<C: Clock> InitDataValidationApi for InitDataValidationService<C> {
    fn validate(&self, request: &ValidationRequest<'_>) -> ValidationOutcome {
        self.run(request).map(|_| ()).into()
    }

    fn validate_and_parse(&self, request: &ValidationRequest<'_>) -> Result<InitData, InitDataError> {
        let fields = self.run(request)?;
        InitData::from_fields(&fields)
    }

    fn validate_batch(
        &self,
        items: &[WorkItem],
        mode: FailureMode,
    ) -> Result<Vec<ValidationReport>, BatchError> {
        let outcomes: Vec<ValidationOutcome> = if self.parallel {
            items.par_iter().map(|item| self.validate_item(item)).collect()
        } else {
            items.iter().map(|item| self.validate_item(item)).collect()
        };

        if mode == FailureMode::StopOnFail {
            let first_failure = outcomes.iter().enumerate().find_map(|(index, outcome)| {
                match outcome {
                    ValidationOutcome::Valid => None,
                    ValidationOutcome::Invalid(e) => Some(BatchError::new(index, e)),
                }
            });
            if let Some(error) = first_failure {
                return Err(error);
            }
        }

        let valid_count = outcomes.iter().filter(|o| o.is_valid()).count();
        debug!(
            items = items.len(),
            valid = valid_count,
            invalid = items.len() - valid_count,
            "Batch validated"
        );

        Ok(outcomes.iter().map(ValidationReport::from).collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
