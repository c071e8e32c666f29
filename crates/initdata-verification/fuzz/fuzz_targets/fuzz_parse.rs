//! Fuzz target for the init data parser.
//!
//! ## Running
//!
//! ```bash
//! cd crates/initdata-verification
//! cargo +nightly fuzz run fuzz_parse
//! ```

#![no_main]

use initdata_verification::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: &str| {
    // Must never panic, regardless of input
    let result = parse(raw);

    // Deterministic
    assert_eq!(result, parse(raw));

    if let Ok(fields) = result {
        // Keys are unique and non-empty
        assert!(fields.iter().all(|(k, _)| !k.is_empty()));
        assert!(fields.len() <= raw.split('&').count());
    }
});
