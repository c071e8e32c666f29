//! # Forgery
//!
//! Signatures from the wrong key, the wrong bot, the wrong environment, or
//! no key at all.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use ed25519_dalek::{Signer, SigningKey};
    use initdata_verification::domain::canonical::canonical_message;
    use initdata_verification::domain::test_helpers::*;
    use initdata_verification::{
        parse, Environment, ErrorKind, FieldSet, InitDataValidationApi, SignatureScheme,
        ValidationRequest,
    };

    const BOT_ID: u64 = 987_654_321;

    fn validate(raw: &str, bot_id: u64, env: Environment) -> Option<ErrorKind> {
        local_service(NOW)
            .validate(&ValidationRequest::new(raw, bot_id, env))
            .kind()
    }

    /// Test: A correctly formed signature from an untrusted key
    #[test]
    fn test_self_signed_payload() {
        let attacker = SigningKey::generate(&mut rand::rngs::OsRng);
        let pairs = [("auth_date", NOW.to_string())];
        let fields: FieldSet = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let message = canonical_message(&fields, SignatureScheme::ThirdParty, BOT_ID);
        let signature = URL_SAFE_NO_PAD.encode(attacker.sign(message.as_bytes()).to_bytes());

        let raw = format!("auth_date={NOW}&signature={signature}");
        assert_eq!(
            validate(&raw, BOT_ID, Environment::Production),
            Some(ErrorKind::SignatureMismatch)
        );
    }

    /// Test: Replaying one bot's payload against another bot
    #[test]
    fn test_cross_bot_replay() {
        let raw = third_party_payload(&[("query_id", "q")], NOW, BOT_ID, Environment::Production);
        assert_eq!(
            validate(&raw, BOT_ID + 1, Environment::Production),
            Some(ErrorKind::SignatureMismatch)
        );
    }

    /// Test: Third-party test-environment payload presented to production and
    /// back (hash-only payloads carry no environment binding)
    #[test]
    fn test_cross_environment_replay() {
        for (signed_in, presented_in) in [
            (Environment::Test, Environment::Production),
            (Environment::Production, Environment::Test),
        ] {
            let raw = third_party_payload(&[], NOW, BOT_ID, signed_in);
            assert_eq!(validate(&raw, BOT_ID, presented_in), Some(ErrorKind::SignatureMismatch));
        }
    }

    /// Test: Random, truncated and zeroed signatures
    #[test]
    fn test_garbage_signatures() {
        let raw = third_party_payload(&[], NOW, BOT_ID, Environment::Production);
        let signature = parse(&raw).unwrap().get("signature").unwrap().to_string();
        let base = format!("auth_date={NOW}");

        let zeroed = URL_SAFE_NO_PAD.encode([0u8; 64]);
        assert_eq!(
            validate(&format!("{base}&signature={zeroed}"), BOT_ID, Environment::Production),
            Some(ErrorKind::SignatureMismatch)
        );

        let truncated = &signature[..signature.len() - 4];
        assert_eq!(
            validate(&format!("{base}&signature={truncated}"), BOT_ID, Environment::Production),
            Some(ErrorKind::InvalidSignatureEncoding)
        );

        let hex_sig = hex::encode([7u8; 64]);
        assert_eq!(
            validate(&format!("{base}&signature={hex_sig}"), BOT_ID, Environment::Production),
            Some(ErrorKind::InvalidSignatureEncoding)
        );

        for _ in 0..16 {
            let random: [u8; 64] = std::array::from_fn(|_| rand::random());
            let forged = format!("{base}&signature={}", URL_SAFE_NO_PAD.encode(random));
            assert_eq!(
                validate(&forged, BOT_ID, Environment::Production),
                Some(ErrorKind::SignatureMismatch)
            );
        }
    }

    /// Test: Hash of the wrong length or alphabet
    #[test]
    fn test_malformed_hash() {
        let token = "987654321:AAF-secret";
        let raw = bot_token_payload(&[], NOW, token);
        let hash = parse(&raw).unwrap().get("hash").unwrap().to_string();

        let bad_digit = format!("{}g", &hash[..63]);
        for bad in [&hash[..62], "zz", bad_digit.as_str()] {
            let forged = format!("auth_date={NOW}&hash={bad}");
            let request = ValidationRequest::new(&forged, BOT_ID, Environment::Production)
                .with_bot_token(token);
            assert_eq!(
                local_service(NOW).validate(&request).kind(),
                Some(ErrorKind::InvalidSignatureEncoding),
                "hash {bad}"
            );
        }
    }

    /// Test: A token belonging to another bot is refused before any HMAC
    #[test]
    fn test_foreign_bot_token() {
        let raw = bot_token_payload(&[], NOW, "1:AAF-secret");
        let request = ValidationRequest::new(&raw, BOT_ID, Environment::Production)
            .with_bot_token("1:AAF-secret");
        assert_eq!(
            local_service(NOW).validate(&request).kind(),
            Some(ErrorKind::InvalidSigningContext)
        );
    }
}
