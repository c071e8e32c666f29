//! # Integration Test Flows
//!
//! Locally signed payloads pushed through every layer:
//!
//! 1. **Service**: single validation with both schemes
//! 2. **Host adapter**: JSON parameter objects to reports, both failure modes
//! 3. **Runtime**: configuration-driven batch runs

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use initdata_runtime::{run_batch, RuntimeConfig};
    use initdata_verification::domain::test_helpers::*;
    use initdata_verification::{
        Environment, ErrorKind, FailureMode, FixedClock, HostAdapter, HostError,
        InitDataValidationApi, ValidationRequest, WorkItem,
    };
    use serde_json::json;

    const BOT_ID: u64 = 5_000_000_001;
    const TOKEN: &str = "5000000001:AAHk-integration-secret";

    // =============================================================================
    // SERVICE
    // =============================================================================

    /// Test: A client payload with signature and hash passes both schemes
    #[test]
    fn test_full_payload_passes_both_schemes() {
        let raw = full_payload(
            &[("query_id", "AAG1"), ("user", r#"{"id":9,"first_name":"Eve"}"#)],
            NOW - 100,
            TOKEN,
            BOT_ID,
            Environment::Production,
        );
        let service = local_service(NOW);

        let third_party = ValidationRequest::new(&raw, BOT_ID, Environment::Production);
        assert!(service.validate(&third_party).is_valid());

        let options = initdata_verification::ValidationOptions {
            scheme: initdata_verification::SchemePreference::BotToken,
            ..Default::default()
        };
        let hmac = ValidationRequest::new(&raw, BOT_ID, Environment::Production)
            .with_options(options)
            .with_bot_token(TOKEN);
        assert!(service.validate(&hmac).is_valid());
    }

    /// Test: Hash-only payload is verified with the bot token in auto mode
    #[test]
    fn test_hash_only_payload_in_auto_mode() {
        let raw = bot_token_payload(&[("chat_type", "group")], NOW, TOKEN);
        let service = local_service(NOW);

        let request = ValidationRequest::new(&raw, BOT_ID, Environment::Test).with_bot_token(TOKEN);
        assert!(service.validate(&request).is_valid());

        let wrong = "5000000001:AAHk-other-secret";
        let request = ValidationRequest::new(&raw, BOT_ID, Environment::Test).with_bot_token(wrong);
        assert_eq!(service.validate(&request).kind(), Some(ErrorKind::SignatureMismatch));
    }

    /// Test: Every error kind is reachable through the public API
    #[test]
    fn test_every_error_kind_is_reachable() {
        let service = local_service(NOW);
        let good = third_party_payload(&[], NOW, BOT_ID, Environment::Production);
        let old = third_party_payload(&[], NOW - 90_000, BOT_ID, Environment::Production);

        let cases: Vec<(String, u64, ErrorKind)> = vec![
            ("auth_date".into(), BOT_ID, ErrorKind::MalformedPayload),
            ("auth_date=1".into(), BOT_ID, ErrorKind::MissingRequiredField),
            ("auth_date=1&signature=***".into(), BOT_ID, ErrorKind::InvalidSignatureEncoding),
            (good.replace("auth_date=", "auth_date=1"), BOT_ID, ErrorKind::SignatureMismatch),
            (old, BOT_ID, ErrorKind::Expired),
            (good, 0, ErrorKind::InvalidSigningContext),
        ];

        for (raw, bot_id, expected) in cases {
            let request = ValidationRequest::new(&raw, bot_id, Environment::Production);
            assert_eq!(service.validate(&request).kind(), Some(expected), "payload {raw}");
        }
    }

    // =============================================================================
    // HOST ADAPTER
    // =============================================================================

    fn host_params() -> Vec<serde_json::Value> {
        let prod = third_party_payload(&[("start_param", "a")], NOW, BOT_ID, Environment::Production);
        let test = third_party_payload(&[("start_param", "b")], NOW, BOT_ID, Environment::Test);
        vec![
            json!({ "initData": prod, "botId": BOT_ID, "isTestEnvironment": false }),
            json!({ "initData": test, "botId": BOT_ID, "isTestEnvironment": false }),
            json!({ "initData": test, "botId": BOT_ID, "isTestEnvironment": true }),
            json!({ "initData": "broken", "botId": BOT_ID }),
        ]
    }

    /// Test: Continue mode keeps order and annotates failures
    #[test]
    fn test_host_continue_on_fail() {
        let adapter = HostAdapter::new(local_service(NOW), FailureMode::ContinueOnFail);
        let reports = adapter.execute(host_params()).unwrap();

        let valid: Vec<bool> = reports.iter().map(|r| r.valid).collect();
        assert_eq!(valid, vec![true, false, true, false]);
        assert_eq!(reports[1].reason, Some(ErrorKind::SignatureMismatch));
        assert_eq!(reports[3].reason, Some(ErrorKind::MalformedPayload));

        let json = serde_json::to_value(&reports[1]).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "SIGNATURE_MISMATCH");
        assert!(json["message"].is_string());
    }

    /// Test: Stop mode reports the first failing item
    #[test]
    fn test_host_stop_on_fail() {
        let adapter = HostAdapter::new(local_service(NOW), FailureMode::StopOnFail);
        match adapter.execute(host_params()) {
            Err(HostError::Validation(e)) => {
                assert_eq!(e.item_index, 1);
                assert_eq!(e.kind, ErrorKind::SignatureMismatch);
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    /// Test: One failing item never changes another item's outcome
    #[test]
    fn test_items_are_independent() {
        let service = local_service(NOW);
        let good = WorkItem::new(
            third_party_payload(&[], NOW, BOT_ID, Environment::Production),
            BOT_ID,
            false,
        );
        let bad = WorkItem::new("x=1", BOT_ID, false);

        let alone = service
            .validate_batch(std::slice::from_ref(&good), FailureMode::ContinueOnFail)
            .unwrap();
        let mixed = service
            .validate_batch(&[bad.clone(), good.clone(), bad], FailureMode::ContinueOnFail)
            .unwrap();
        assert_eq!(alone[0], mixed[1]);
    }

    /// Test: Per-item max age override
    #[test]
    fn test_per_item_max_age() {
        let raw = third_party_payload(&[], NOW - 120, BOT_ID, Environment::Production);
        let mut strict = WorkItem::new(raw.clone(), BOT_ID, false);
        strict.max_age_secs = Some(60);
        let mut unlimited = WorkItem::new(raw, BOT_ID, false);
        unlimited.max_age_secs = Some(0);

        let reports = local_service(NOW + 1_000_000)
            .validate_batch(&[strict, unlimited], FailureMode::ContinueOnFail)
            .unwrap();
        assert_eq!(reports[0].reason, Some(ErrorKind::Expired));
        assert!(reports[1].valid);
    }

    // =============================================================================
    // RUNTIME
    // =============================================================================

    fn local_config() -> RuntimeConfig {
        let anchors = test_anchors();
        let mut config = RuntimeConfig::default();
        config.validation.production_key = *anchors.key_bytes(Environment::Production);
        config.validation.test_key = *anchors.key_bytes(Environment::Test);
        config
    }

    /// Test: Runtime batch with environment-style overrides
    #[test]
    fn test_runtime_batch_with_env_overrides() {
        let mut config = local_config();
        config
            .apply_env(|key| match key {
                "IDG_FAILURE_MODE" => Some("stop".into()),
                "IDG_PARALLEL" => Some("false".into()),
                _ => None,
            })
            .unwrap();
        config.validate().unwrap();

        let input = serde_json::Value::Array(host_params()).to_string();
        let err = run_batch(&config, FixedClock(NOW), &input).unwrap_err();
        assert!(err.is_abort());

        config.batch.failure_mode = FailureMode::ContinueOnFail;
        let reports = run_batch(&config, FixedClock(NOW), &input).unwrap();
        assert_eq!(reports.len(), 4);
    }

    /// Test: The real Telegram payload through the runtime defaults
    #[test]
    fn test_runtime_reference_payload() {
        let input = json!([{
            "init_data": REFERENCE_INIT_DATA,
            "bot_id": REFERENCE_BOT_ID,
            "is_test_environment": false
        }])
        .to_string();

        let reports = run_batch(
            &RuntimeConfig::default(),
            FixedClock(REFERENCE_AUTH_DATE + 60),
            &input,
        )
        .unwrap();
        assert!(reports[0].valid);
    }
}
