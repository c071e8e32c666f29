//! # Init Data Parser
//!
//! Turns the raw `&`-delimited, percent-encoded query string into a
//! [`FieldSet`].
//!
//! ## Rules
//!
//! - Empty segments (`a=1&&b=2`, trailing `&`) are skipped
//! - Every other segment must contain `=`; the first one splits key from value
//! - `+` decodes to a space, `%XX` to the byte `0xXX`; a `%` not followed by
//!   two hex digits is rejected, as is a decoded value that is not UTF-8
//! - Keys must be non-empty and unique

use super::entities::FieldSet;
use super::errors::InitDataError;

/// Parse a raw init data string into its decoded fields.
pub fn parse(raw: &str) -> Result<FieldSet, InitDataError> {
    let mut fields = FieldSet::new();

    for (index, segment) in raw.split('&').enumerate() {
        if segment.is_empty() {
            continue;
        }

        let (raw_key, raw_value) = segment
            .split_once('=')
            .ok_or(InitDataError::MissingSeparator { index })?;

        let key = decode_component(raw_key, index)?;
        if key.is_empty() {
            return Err(InitDataError::EmptyKey { index });
        }
        let value = decode_component(raw_value, index)?;

        if fields.contains(&key) {
            return Err(InitDataError::DuplicateField(key));
        }
        fields.insert(key, value);
    }

    Ok(fields)
}

/// Decode one form-encoded component.
fn decode_component(component: &str, index: usize) -> Result<String, InitDataError> {
    if !has_valid_escapes(component.as_bytes()) {
        return Err(InitDataError::InvalidEncoding { index });
    }

    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| InitDataError::InvalidEncoding { index })
}

/// Every `%` must be followed by exactly two hex digits.
fn has_valid_escapes(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
