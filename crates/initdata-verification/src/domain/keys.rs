//! # Signing Context
//!
//! Derives the verification keys for one call from the bot identifier, the
//! environment flag and (for the HMAC scheme) the bot token.
//!
//! ## Keyspaces
//!
//! - **Third-party (Ed25519)**: Telegram signs with one key in production and
//!   another in the test environment. The message also binds the bot id, so a
//!   payload never verifies under a different environment or bot.
//! - **Bot token (HMAC-SHA256)**: `secret = HMAC(key = "WebAppData", bot_token)`.
//!   The environment flag plays no part in the secret. A hash-only payload
//!   verifies under either flag given the right token, so environment
//!   separation holds only for the third-party scheme. Test-environment bots
//!   do have their own tokens.

use super::canonical::WEB_APP_DATA;
use super::entities::Environment;
use super::errors::InitDataError;
use ed25519_dalek::VerifyingKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Telegram's production Ed25519 public key.
pub const TELEGRAM_PRODUCTION_KEY: [u8; 32] = [
    0xe7, 0xbf, 0x03, 0xa2, 0xfa, 0x46, 0x02, 0xaf, 0x45, 0x80, 0x70, 0x3d, 0x88, 0xdd, 0xa5, 0xbb,
    0x59, 0xf3, 0x2e, 0xd8, 0xb0, 0x2a, 0x56, 0xc1, 0x87, 0xfe, 0x7d, 0x34, 0xca, 0xed, 0x24, 0x2d,
];

/// Telegram's test-environment Ed25519 public key.
pub const TELEGRAM_TEST_KEY: [u8; 32] = [
    0x40, 0x05, 0x50, 0x58, 0xa4, 0xee, 0x38, 0x15, 0x6a, 0x06, 0x56, 0x2e, 0x52, 0xee, 0xce, 0x92,
    0xa7, 0x71, 0xbc, 0xd8, 0x34, 0x6a, 0x8c, 0x46, 0x15, 0xcb, 0x73, 0x76, 0xed, 0xdf, 0x72, 0xec,
];

// =============================================================================
// TRUST ANCHORS
// =============================================================================

/// Ed25519 public keys trusted per environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrustAnchors {
    pub production: [u8; 32],
    pub test: [u8; 32],
}

impl TrustAnchors {
    pub fn new(production: [u8; 32], test: [u8; 32]) -> Self {
        Self { production, test }
    }

    /// Raw key bytes for `environment`.
    pub fn key_bytes(&self, environment: Environment) -> &[u8; 32] {
        match environment {
            Environment::Production => &self.production,
            Environment::Test => &self.test,
        }
    }

    /// Decoded verifying key for `environment`.
    pub fn verifying_key(&self, environment: Environment) -> Result<VerifyingKey, InitDataError> {
        VerifyingKey::from_bytes(self.key_bytes(environment)).map_err(|_| {
            InitDataError::InvalidSigningContext(format!(
                "trust anchor for {environment:?} is not a valid Ed25519 point"
            ))
        })
    }
}

impl Default for TrustAnchors {
    /// Telegram's published keys.
    fn default() -> Self {
        Self::new(TELEGRAM_PRODUCTION_KEY, TELEGRAM_TEST_KEY)
    }
}

// =============================================================================
// SIGNING CONTEXT
// =============================================================================

/// HMAC secret derived from a bot token. Cleared on drop.
pub struct BotSecret(Zeroizing<[u8; 32]>);

impl BotSecret {
    /// `HMAC-SHA256(key = "WebAppData", message = bot_token)`.
    pub fn derive(bot_token: &str) -> Self {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(WEB_APP_DATA.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(bot_token.as_bytes());

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&mac.finalize().into_bytes());
        Self(secret)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for BotSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BotSecret(..)")
    }
}

/// Everything needed to verify one payload.
#[derive(Debug)]
pub struct SigningContext {
    pub bot_id: u64,
    pub environment: Environment,
    /// Telegram's Ed25519 key for `environment`
    pub verifying_key: VerifyingKey,
    /// Present only when a bot token was supplied
    pub bot_secret: Option<BotSecret>,
}

impl SigningContext {
    /// Derive the context for `(bot_id, environment)`.
    ///
    /// # Errors
    /// * `InvalidSigningContext` - `bot_id` is zero, the trust anchor is not a
    ///   valid key, or the token does not belong to `bot_id`
    pub fn derive(
        bot_id: u64,
        environment: Environment,
        bot_token: Option<&str>,
        anchors: &TrustAnchors,
    ) -> Result<Self, InitDataError> {
        if bot_id == 0 {
            return Err(InitDataError::InvalidSigningContext(
                "bot id must be a positive integer".to_string(),
            ));
        }

        let verifying_key = anchors.verifying_key(environment)?;

        let bot_secret = match bot_token {
            Some(token) => {
                check_token_owner(token, bot_id)?;
                Some(BotSecret::derive(token))
            }
            None => None,
        };

        Ok(Self {
            bot_id,
            environment,
            verifying_key,
            bot_secret,
        })
    }

    /// Secret for the HMAC scheme.
    pub fn require_secret(&self) -> Result<&BotSecret, InitDataError> {
        self.bot_secret.as_ref().ok_or_else(|| {
            InitDataError::InvalidSigningContext(
                "hash verification requires the bot token".to_string(),
            )
        })
    }
}

/// Bot tokens look like `{bot_id}:{secret}`.
fn check_token_owner(token: &str, bot_id: u64) -> Result<(), InitDataError> {
    let owner = token
        .split_once(':')
        .and_then(|(id, secret)| (!secret.is_empty()).then_some(id))
        .and_then(|id| id.parse::<u64>().ok());

    match owner {
        Some(id) if id == bot_id => Ok(()),
        Some(_) => Err(InitDataError::InvalidSigningContext(
            "bot token does not belong to the given bot id".to_string(),
        )),
        None => Err(InitDataError::InvalidSigningContext(
            "bot token is not in {bot_id}:{secret} form".to_string(),
        )),
    }
}
