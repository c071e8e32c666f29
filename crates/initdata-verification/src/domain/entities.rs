//! # Domain Entities
//!
//! Core data structures for init data validation. All of them are built per
//! call and dropped after it; nothing here is shared across validations.

use super::errors::{ErrorKind, InitDataError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Field carrying the hex HMAC-SHA256 authentication code.
pub const HASH_FIELD: &str = "hash";

/// Field carrying the base64url Ed25519 signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// Field carrying the issue time (Unix seconds).
pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Default maximum age of init data (24 hours).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Default tolerance for `auth_date` values ahead of the local clock.
pub const DEFAULT_MAX_FUTURE_SKEW: Duration = Duration::from_secs(60);

// =============================================================================
// FIELD SET
// =============================================================================

/// Decoded `key -> value` pairs of an init data payload.
///
/// Keys are unique and iterate in ascending byte-wise order, which is the
/// order the data-check string is built in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeMap<String, String>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. Returns `false` (and keeps the original) if the key
    /// is already present.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        use std::collections::btree_map::Entry;

        match self.fields.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Look up a decoded value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate fields in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parsed `auth_date` in Unix seconds.
    pub fn auth_date(&self) -> Result<u64, InitDataError> {
        let raw = self
            .get(AUTH_DATE_FIELD)
            .ok_or(InitDataError::MissingField(AUTH_DATE_FIELD))?;

        // u64::from_str accepts a leading '+', the issuer never emits one
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InitDataError::InvalidField {
                field: AUTH_DATE_FIELD.to_string(),
                detail: "expected unsigned decimal seconds".to_string(),
            });
        }

        raw.parse().map_err(|_| InitDataError::InvalidField {
            field: AUTH_DATE_FIELD.to_string(),
            detail: "value out of range".to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    /// Later duplicates are ignored; use the parser for strict handling.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k.into(), v.into());
        }
        set
    }
}

// =============================================================================
// SIGNING CONTEXT INPUTS
// =============================================================================

/// Telegram environment the init data was issued in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Map the host's `isTestEnvironment` flag.
    pub fn from_test_flag(is_test: bool) -> Self {
        if is_test {
            Environment::Test
        } else {
            Environment::Production
        }
    }

    pub fn is_test(self) -> bool {
        matches!(self, Environment::Test)
    }
}

/// Signature scheme used to authenticate a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// HMAC-SHA256 keyed from the bot token, carried in `hash` (hex)
    BotToken,
    /// Ed25519 by Telegram over `{bot_id}:WebAppData\n...`, carried in `signature` (base64url)
    ThirdParty,
}

impl SignatureScheme {
    /// Field holding this scheme's signature value.
    pub fn signature_field(self) -> &'static str {
        match self {
            SignatureScheme::BotToken => HASH_FIELD,
            SignatureScheme::ThirdParty => SIGNATURE_FIELD,
        }
    }

    /// Fields left out of this scheme's data-check string.
    pub fn excluded_fields(self) -> &'static [&'static str] {
        match self {
            // `hash` is computed over everything else, `signature` included
            SignatureScheme::BotToken => &[HASH_FIELD],
            SignatureScheme::ThirdParty => &[HASH_FIELD, SIGNATURE_FIELD],
        }
    }
}

/// Caller preference for scheme selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemePreference {
    /// `signature` present → third-party, else `hash` present → bot token
    #[default]
    Auto,
    /// Always verify the Ed25519 `signature`
    ThirdParty,
    /// Always verify the HMAC `hash`
    BotToken,
}

impl SchemePreference {
    /// Resolve the scheme for a parsed payload.
    pub fn select(self, fields: &FieldSet) -> Result<SignatureScheme, InitDataError> {
        let scheme = match self {
            SchemePreference::ThirdParty => SignatureScheme::ThirdParty,
            SchemePreference::BotToken => SignatureScheme::BotToken,
            SchemePreference::Auto if fields.contains(SIGNATURE_FIELD) => {
                SignatureScheme::ThirdParty
            }
            SchemePreference::Auto if fields.contains(HASH_FIELD) => SignatureScheme::BotToken,
            SchemePreference::Auto => return Err(InitDataError::MissingField(SIGNATURE_FIELD)),
        };

        if !fields.contains(scheme.signature_field()) {
            return Err(InitDataError::MissingField(scheme.signature_field()));
        }
        Ok(scheme)
    }
}

// =============================================================================
// EXPIRY POLICY
// =============================================================================

/// Freshness window applied to `auth_date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Maximum accepted age; `None` disables the age check
    pub max_age: Option<Duration>,
    /// Maximum accepted distance of `auth_date` ahead of the local clock
    pub max_future_skew: Duration,
}

impl ExpiryPolicy {
    /// Policy that never expires payloads (future skew is still bounded).
    pub fn no_expiry() -> Self {
        Self {
            max_age: None,
            ..Self::default()
        }
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            max_age: Some(max_age),
            ..Self::default()
        }
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            max_age: Some(DEFAULT_MAX_AGE),
            max_future_skew: DEFAULT_MAX_FUTURE_SKEW,
        }
    }
}

/// Per-call validation options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub scheme: SchemePreference,
    pub expiry: ExpiryPolicy,
}

// =============================================================================
// REQUEST / OUTCOME
// =============================================================================

/// A single validation request.
#[derive(Clone, Debug)]
pub struct ValidationRequest<'a> {
    /// Raw `window.Telegram.WebApp.initData` string
    pub init_data: &'a str,
    /// Numeric bot identifier
    pub bot_id: u64,
    pub environment: Environment,
    /// Bot token, required only for the HMAC scheme
    pub bot_token: Option<&'a str>,
    pub options: ValidationOptions,
}

impl<'a> ValidationRequest<'a> {
    /// Third-party request with default options.
    pub fn new(init_data: &'a str, bot_id: u64, environment: Environment) -> Self {
        Self {
            init_data,
            bot_id,
            environment,
            bot_token: None,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_bot_token(mut self, token: &'a str) -> Self {
        self.bot_token = Some(token);
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.options.expiry.max_age = max_age;
        self
    }
}

/// Result of one validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(InitDataError),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Reason for rejection, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(e) => Some(e.kind()),
        }
    }

    pub fn into_result(self) -> Result<(), InitDataError> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(e) => Err(e),
        }
    }
}

impl From<Result<(), InitDataError>> for ValidationOutcome {
    fn from(result: Result<(), InitDataError>) -> Self {
        match result {
            Ok(()) => ValidationOutcome::Valid,
            Err(e) => ValidationOutcome::Invalid(e),
        }
    }
}

/// Caller-facing report: `{ valid: true }` or
/// `{ valid: false, reason: <CODE>, message: <text> }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            message: None,
        }
    }

    pub fn invalid(error: &InitDataError) -> Self {
        Self {
            valid: false,
            reason: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }
}

impl From<&ValidationOutcome> for ValidationReport {
    fn from(outcome: &ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid => ValidationReport::valid(),
            ValidationOutcome::Invalid(e) => ValidationReport::invalid(e),
        }
    }
}
