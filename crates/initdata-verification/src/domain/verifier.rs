//! # Init Data Verifier
//!
//! Signature and freshness checks over a parsed payload.
//!
//! ## Security Notes
//!
//! - **Constant-Time HMAC Comparison**: the supplied `hash` is compared with
//!   `subtle::ConstantTimeEq`
//! - **Strict Codecs**: `hash` must be hex and `signature` base64url; a value in
//!   the wrong codec is reported as `InvalidSignatureEncoding`, not a mismatch
//! - **Strict Ed25519**: `verify_strict` rejects small-order keys and
//!   non-canonical signatures
//! - **Check Order**: signature first, then freshness. An `Expired` verdict
//!   therefore always refers to an authentic `auth_date`

use super::canonical::canonical_message;
use super::entities::{ExpiryPolicy, FieldSet, SignatureScheme, ValidationRequest};
use super::errors::InitDataError;
use super::keys::{BotSecret, SigningContext, TrustAnchors};
use super::parser::parse;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output length.
pub const HASH_LEN: usize = 32;

/// base64url decoder accepting both padded and unpadded input.
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// =============================================================================
// SIGNATURE CHECKS
// =============================================================================

/// Verify the hex `hash` field over `message` with the bot secret.
pub fn verify_hash(message: &str, hash_hex: &str, secret: &BotSecret) -> Result<(), InitDataError> {
    let supplied = hex::decode(hash_hex).map_err(|_| InitDataError::InvalidSignatureEncoding {
        field: "hash",
        encoding: "hex",
    })?;
    if supplied.len() != HASH_LEN {
        return Err(InitDataError::InvalidSignatureEncoding {
            field: "hash",
            encoding: "hex",
        });
    }

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let expected = mac.finalize().into_bytes();

    if bool::from(expected.as_slice().ct_eq(&supplied)) {
        Ok(())
    } else {
        Err(InitDataError::SignatureMismatch)
    }
}

/// Verify the base64url Ed25519 `signature` field over `message`.
pub fn verify_signature(
    message: &str,
    signature_b64: &str,
    key: &VerifyingKey,
) -> Result<(), InitDataError> {
    let invalid = || InitDataError::InvalidSignatureEncoding {
        field: "signature",
        encoding: "base64url",
    };

    let bytes = BASE64_URL.decode(signature_b64).map_err(|_| invalid())?;
    let bytes: [u8; Signature::BYTE_SIZE] = bytes.try_into().map_err(|_| invalid())?;
    let signature = Signature::from_bytes(&bytes);

    key.verify_strict(message.as_bytes(), &signature)
        .map_err(|_| InitDataError::SignatureMismatch)
}

/// Verify the signature of `scheme` over the canonical message of `fields`.
pub fn verify_scheme(
    fields: &FieldSet,
    scheme: SignatureScheme,
    context: &SigningContext,
) -> Result<(), InitDataError> {
    let supplied = fields
        .get(scheme.signature_field())
        .ok_or(InitDataError::MissingField(scheme.signature_field()))?;

    let message = canonical_message(fields, scheme, context.bot_id);
    debug!(
        bot_id = context.bot_id,
        environment = ?context.environment,
        ?scheme,
        fields = fields.len(),
        "Verifying init data signature"
    );

    match scheme {
        SignatureScheme::BotToken => verify_hash(&message, supplied, context.require_secret()?),
        SignatureScheme::ThirdParty => {
            verify_signature(&message, supplied, &context.verifying_key)
        }
    }
}

// =============================================================================
// FRESHNESS
// =============================================================================

/// Check `auth_date` against `now` (both Unix seconds).
///
/// Age exactly equal to `max_age` is accepted; one second more is `Expired`.
/// An `auth_date` more than `max_future_skew` ahead of `now` is also rejected.
pub fn check_freshness(auth_date: u64, now: u64, policy: &ExpiryPolicy) -> Result<(), InitDataError> {
    if auth_date > now {
        let ahead = auth_date - now;
        let max_skew = policy.max_future_skew.as_secs();
        if ahead > max_skew {
            return Err(InitDataError::FromTheFuture {
                auth_date,
                ahead,
                max_skew,
            });
        }
        return Ok(());
    }

    if let Some(max_age) = policy.max_age {
        let age = now - auth_date;
        let max_age = max_age.as_secs();
        if age > max_age {
            return Err(InitDataError::Expired {
                auth_date,
                age,
                max_age,
            });
        }
    }

    Ok(())
}

// =============================================================================
// FULL VERIFICATION
// =============================================================================

/// Run the whole pipeline for one request at time `now`.
///
/// Parser → scheme selection → signing context → signature → freshness.
/// Returns the parsed fields of an accepted payload.
pub fn validate_request(
    request: &ValidationRequest<'_>,
    anchors: &TrustAnchors,
    now: u64,
) -> Result<FieldSet, InitDataError> {
    let fields = parse(request.init_data)?;
    let scheme = request.options.scheme.select(&fields)?;
    let context = SigningContext::derive(
        request.bot_id,
        request.environment,
        request.bot_token,
        anchors,
    )?;

    verify_fields(&fields, scheme, &context, &request.options.expiry, now)?;
    Ok(fields)
}

/// Signature first, then freshness.
pub fn verify_fields(
    fields: &FieldSet,
    scheme: SignatureScheme,
    context: &SigningContext,
    policy: &ExpiryPolicy,
    now: u64,
) -> Result<(), InitDataError> {
    let auth_date = fields.auth_date()?;
    verify_scheme(fields, scheme, context)?;
    check_freshness(auth_date, now, policy)
}
