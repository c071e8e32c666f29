//! # Validation Errors
//!
//! Error taxonomy for init data validation. Every rejection carries exactly
//! one [`ErrorKind`]; callers branch on the kind, never on the message text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable, enumerable reason for a failed validation.
///
/// Serialized as `SCREAMING_SNAKE_CASE` codes (see [`ErrorKind::code`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Payload could not be parsed (bad segment, bad escape, duplicate key)
    MalformedPayload,
    /// `auth_date` or the signature field of the active scheme is absent
    MissingRequiredField,
    /// Signature value is not valid hex / base64url or has the wrong length
    InvalidSignatureEncoding,
    /// Signature does not match the canonical data-check string
    SignatureMismatch,
    /// `auth_date` is outside the freshness window
    Expired,
    /// Bot identifier / environment / token combination is unusable
    InvalidSigningContext,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::MalformedPayload,
        ErrorKind::MissingRequiredField,
        ErrorKind::InvalidSignatureEncoding,
        ErrorKind::SignatureMismatch,
        ErrorKind::Expired,
        ErrorKind::InvalidSigningContext,
    ];

    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::InvalidSignatureEncoding => "INVALID_SIGNATURE_ENCODING",
            ErrorKind::SignatureMismatch => "SIGNATURE_MISMATCH",
            ErrorKind::Expired => "EXPIRED",
            ErrorKind::InvalidSigningContext => "INVALID_SIGNING_CONTEXT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors produced while validating init data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitDataError {
    /// A non-empty segment has no `=` separator
    #[error("Segment {index} has no key/value separator")]
    MissingSeparator { index: usize },

    /// A segment has an empty key
    #[error("Segment {index} has an empty key")]
    EmptyKey { index: usize },

    /// Percent-decoding failed (bad escape or invalid UTF-8)
    #[error("Invalid percent-encoding in segment {index}")]
    InvalidEncoding { index: usize },

    /// The same key appears more than once
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// A field value does not have the expected shape
    #[error("Invalid value for field {field}: {detail}")]
    InvalidField { field: String, detail: String },

    /// A mandatory field is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The signature value could not be decoded with the issuer's codec
    #[error("Invalid {encoding} encoding for field {field}")]
    InvalidSignatureEncoding {
        field: &'static str,
        encoding: &'static str,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureMismatch,

    /// `auth_date` older than the allowed maximum age
    #[error("Init data expired: auth_date {auth_date} is {age}s old, max age {max_age}s")]
    Expired {
        auth_date: u64,
        age: u64,
        max_age: u64,
    },

    /// `auth_date` too far ahead of the local clock
    #[error("auth_date {auth_date} is {ahead}s in the future, max skew {max_skew}s")]
    FromTheFuture {
        auth_date: u64,
        ahead: u64,
        max_skew: u64,
    },

    /// Signing context cannot be derived
    #[error("Invalid signing context: {0}")]
    InvalidSigningContext(String),
}

impl InitDataError {
    /// Classify this error into its stable [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            InitDataError::MissingSeparator { .. }
            | InitDataError::EmptyKey { .. }
            | InitDataError::InvalidEncoding { .. }
            | InitDataError::DuplicateField(_)
            | InitDataError::InvalidField { .. } => ErrorKind::MalformedPayload,
            InitDataError::MissingField(_) => ErrorKind::MissingRequiredField,
            InitDataError::InvalidSignatureEncoding { .. } => ErrorKind::InvalidSignatureEncoding,
            InitDataError::SignatureMismatch => ErrorKind::SignatureMismatch,
            InitDataError::Expired { .. } | InitDataError::FromTheFuture { .. } => {
                ErrorKind::Expired
            }
            InitDataError::InvalidSigningContext(_) => ErrorKind::InvalidSigningContext,
        }
    }
}
