//! # Test Helpers
//!
//! Issuer-side signing used by unit tests and, through the `test-utils`
//! feature, by the workspace test suite. Payloads are signed with
//! deterministic local Ed25519 keys installed as trust anchors via
//! [`test_anchors`].

use super::canonical::{canonical_message, data_check_string};
use super::entities::{
    Environment, FieldSet, SignatureScheme, AUTH_DATE_FIELD, HASH_FIELD, SIGNATURE_FIELD,
};
use super::keys::{BotSecret, TrustAnchors};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Seed of the local "production" issuer key.
pub const PRODUCTION_SEED: u8 = 0x11;

/// Seed of the local "test environment" issuer key.
pub const TEST_SEED: u8 = 0x22;

/// Deterministic Ed25519 key from a one-byte seed.
pub fn issuer_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// Local issuer key standing in for Telegram in `environment`.
pub fn issuer_key_for(environment: Environment) -> SigningKey {
    match environment {
        Environment::Production => issuer_key(PRODUCTION_SEED),
        Environment::Test => issuer_key(TEST_SEED),
    }
}

/// Trust anchors matching [`issuer_key_for`].
pub fn test_anchors() -> TrustAnchors {
    TrustAnchors::new(
        issuer_key_for(Environment::Production).verifying_key().to_bytes(),
        issuer_key_for(Environment::Test).verifying_key().to_bytes(),
    )
}

/// Ed25519-sign `message`, base64url without padding.
pub fn sign_message(key: &SigningKey, message: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.sign(message.as_bytes()).to_bytes())
}

/// Hex HMAC of `message` under the secret derived from `bot_token`.
pub fn compute_hash(message: &str, bot_token: &str) -> String {
    let secret = BotSecret::derive(bot_token);
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Percent-encode pairs into a query string, keeping their order.
pub fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn with_auth_date<'a>(fields: &[(&'a str, &'a str)], auth_date: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut pairs: Vec<_> = fields.to_vec();
    pairs.push((AUTH_DATE_FIELD, auth_date));
    pairs
}

/// Init data signed by the local issuer for `bot_id` in `environment`.
pub fn third_party_payload(
    fields: &[(&str, &str)],
    auth_date: u64,
    bot_id: u64,
    environment: Environment,
) -> String {
    let auth_date = auth_date.to_string();
    let mut pairs = with_auth_date(fields, &auth_date);

    let set: FieldSet = pairs.iter().copied().collect();
    let message = canonical_message(&set, SignatureScheme::ThirdParty, bot_id);
    let signature = sign_message(&issuer_key_for(environment), &message);

    pairs.push((SIGNATURE_FIELD, &signature));
    encode_pairs(pairs)
}

/// Init data carrying an HMAC `hash` for `bot_token`.
pub fn bot_token_payload(fields: &[(&str, &str)], auth_date: u64, bot_token: &str) -> String {
    let auth_date = auth_date.to_string();
    let mut pairs = with_auth_date(fields, &auth_date);

    let set: FieldSet = pairs.iter().copied().collect();
    let hash = compute_hash(&data_check_string(&set, &[HASH_FIELD]), bot_token);

    pairs.push((HASH_FIELD, &hash));
    encode_pairs(pairs)
}

/// Init data with both a third-party `signature` and a `hash` over it, the
/// way Telegram clients deliver it.
pub fn full_payload(
    fields: &[(&str, &str)],
    auth_date: u64,
    bot_token: &str,
    bot_id: u64,
    environment: Environment,
) -> String {
    let auth_date = auth_date.to_string();
    let mut pairs = with_auth_date(fields, &auth_date);

    let set: FieldSet = pairs.iter().copied().collect();
    let message = canonical_message(&set, SignatureScheme::ThirdParty, bot_id);
    let signature = sign_message(&issuer_key_for(environment), &message);
    pairs.push((SIGNATURE_FIELD, &signature));

    let set: FieldSet = pairs.iter().copied().collect();
    let hash = compute_hash(&data_check_string(&set, &[HASH_FIELD]), bot_token);
    pairs.push((HASH_FIELD, &hash));

    encode_pairs(pairs)
}
