//! # Domain Layer
//!
//! Pure parsing, canonicalization and cryptographic logic with no I/O.
//! The clock is injected by the service layer.

pub mod batch;
pub mod canonical;
pub mod entities;
pub mod errors;
pub mod init_data;
pub mod keys;
pub mod parser;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;
