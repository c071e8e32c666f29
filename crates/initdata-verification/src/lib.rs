//! # Telegram Mini App Init Data Verification
//!
//! Decides whether a Mini App init data string was issued by Telegram for a
//! given bot, has not been altered, and is still fresh.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Parsing, canonicalization and cryptography, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//! - **Adapters Layer** (`adapters/`): Host batch boundary
//!
//! ## Signature Schemes
//!
//! - **Third-party (Ed25519)**: `signature` over `"{bot_id}:WebAppData\n"` plus
//!   the data-check string, verified against Telegram's public key for the
//!   selected environment. Needs no bot token.
//! - **Bot token (HMAC-SHA256)**: `hash` over the data-check string with a key
//!   derived from the bot token. Compared in constant time.
//!
//! ## Security Notes
//!
//! - Production and test keys are disjoint: a payload never validates in the
//!   other environment.
//! - Derived HMAC secrets are zeroized on drop and never logged.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::host::{HostAdapter, HostError};
pub use domain::batch::{BatchError, FailureMode, WorkItem};
pub use domain::entities::{
    Environment, ExpiryPolicy, FieldSet, SchemePreference, SignatureScheme, ValidationOptions,
    ValidationOutcome, ValidationReport, ValidationRequest, DEFAULT_MAX_AGE,
    DEFAULT_MAX_FUTURE_SKEW,
};
pub use domain::errors::{ErrorKind, InitDataError};
pub use domain::init_data::{InitData, WebAppChat, WebAppUser};
pub use domain::keys::{TrustAnchors, TELEGRAM_PRODUCTION_KEY, TELEGRAM_TEST_KEY};
pub use domain::parser::parse;
pub use ports::inbound::InitDataValidationApi;
pub use ports::outbound::{Clock, FixedClock, SystemClock};
pub use service::InitDataValidationService;
