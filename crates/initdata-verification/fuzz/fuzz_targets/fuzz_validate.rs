//! Fuzz target for full init data validation.
//!
//! Arbitrary payloads must produce exactly one outcome and never panic.

#![no_main]

use initdata_verification::{
    Environment, FixedClock, InitDataValidationApi, InitDataValidationService, ValidationRequest,
};
use libfuzzer_sys::fuzz_target;

/// Fuzz input structure for validation.
#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    init_data: String,
    bot_id: u64,
    is_test: bool,
    bot_token: Option<String>,
    now: u64,
}

fuzz_target!(|input: FuzzInput| {
    let service = InitDataValidationService::new(FixedClock(input.now));

    let mut request = ValidationRequest::new(
        &input.init_data,
        input.bot_id,
        Environment::from_test_flag(input.is_test),
    );
    if let Some(token) = input.bot_token.as_deref() {
        request = request.with_bot_token(token);
    }

    let outcome = service.validate(&request);

    // Deterministic under a fixed clock
    assert_eq!(outcome, service.validate(&request));

    // Exactly one reason per rejection
    assert_eq!(outcome.is_valid(), outcome.kind().is_none());
});
