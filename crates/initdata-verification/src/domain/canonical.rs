//! # Data-Check String
//!
//! Rebuilds the exact byte sequence the issuer signed:
//!
//! ```text
//! [{bot_id}:WebAppData\n]key1=value1\nkey2=value2\n...keyN=valueN
//! ```
//!
//! Keys are sorted ascending byte-wise, values are the decoded values (never
//! re-encoded), the scheme's signature fields are left out and there is no
//! trailing separator. The bracketed prefix is present only for the Ed25519
//! third-party scheme. Any deviation here breaks every verification.

use super::entities::{FieldSet, SignatureScheme};

/// Separator between `key=value` lines.
pub const LINE_SEPARATOR: char = '\n';

/// Domain-separation tag shared by both schemes.
pub const WEB_APP_DATA: &str = "WebAppData";

/// Build the sorted `key=value` lines of `fields`, skipping `excluded` keys.
pub fn data_check_string(fields: &FieldSet, excluded: &[&str]) -> String {
    let mut out = String::new();
    // FieldSet iterates in ascending key order
    for (key, value) in fields.iter().filter(|(k, _)| !excluded.contains(k)) {
        if !out.is_empty() {
            out.push(LINE_SEPARATOR);
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// Build the full message signed under `scheme` for `bot_id`.
pub fn canonical_message(fields: &FieldSet, scheme: SignatureScheme, bot_id: u64) -> String {
    let body = data_check_string(fields, scheme.excluded_fields());
    match scheme {
        SignatureScheme::BotToken => body,
        SignatureScheme::ThirdParty => {
            format!("{bot_id}:{WEB_APP_DATA}{LINE_SEPARATOR}{body}")
        }
    }
}
