//! # Validation Benchmarks
//!
//! - Parsing and canonicalization of realistic payloads
//! - Single validation for both schemes
//! - Batch validation, sequential vs rayon, all-valid and mixed batches

use crate::fixtures::{
    local_service, telegram_service, NOW, REFERENCE_AUTH_DATE, REFERENCE_BOT_ID,
    REFERENCE_INIT_DATA,
};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use initdata_verification::domain::canonical::canonical_message;
use initdata_verification::domain::test_helpers::*;
use initdata_verification::{
    parse, Environment, FailureMode, InitDataValidationApi, SchemePreference, SignatureScheme,
    ValidationOptions, ValidationRequest, WorkItem,
};
use rand::Rng;
use std::time::Duration;

const BOT_ID: u64 = 7_000_000_001;
const TOKEN: &str = "7000000001:AAGbench";

fn user_json(id: u64) -> String {
    format!(r#"{{"id":{id},"first_name":"Bench","last_name":"User","username":"bench_{id}","language_code":"en","allows_write_to_pm":true}}"#)
}

/// Mix of valid, cross-environment and tampered items.
fn mixed_batch(size: usize) -> Vec<WorkItem> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| {
            let user = user_json(i as u64);
            let raw = third_party_payload(
                &[("user", user.as_str()), ("chat_type", "private")],
                NOW - rng.gen_range(0..3600),
                BOT_ID,
                Environment::Production,
            );
            match rng.gen_range(0..4) {
                0 => WorkItem::new(raw, BOT_ID, true),
                1 => WorkItem::new(raw.replace("chat_type=private", "chat_type=group"), BOT_ID, false),
                _ => WorkItem::new(raw, BOT_ID, false),
            }
        })
        .collect()
}

pub fn bench_parse_and_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("initdata-parse");

    group.bench_function("parse_reference", |b| {
        b.iter(|| black_box(parse(black_box(REFERENCE_INIT_DATA)).is_ok()))
    });

    let fields = parse(REFERENCE_INIT_DATA).unwrap();
    group.bench_function("canonical_message_reference", |b| {
        b.iter(|| {
            black_box(canonical_message(
                &fields,
                SignatureScheme::ThirdParty,
                REFERENCE_BOT_ID,
            ))
        })
    });

    group.finish();
}

pub fn bench_single_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("initdata-validate");

    let service = telegram_service(REFERENCE_AUTH_DATE);
    let request =
        ValidationRequest::new(REFERENCE_INIT_DATA, REFERENCE_BOT_ID, Environment::Production);
    group.bench_function("ed25519_reference", |b| {
        b.iter(|| black_box(service.validate(&request).is_valid()))
    });

    let local = local_service(NOW);
    let user = user_json(1);
    let raw = full_payload(&[("user", user.as_str())], NOW, TOKEN, BOT_ID, Environment::Production);
    let options = ValidationOptions {
        scheme: SchemePreference::BotToken,
        ..ValidationOptions::default()
    };
    let hmac = ValidationRequest::new(&raw, BOT_ID, Environment::Production)
        .with_options(options)
        .with_bot_token(TOKEN);
    group.bench_function("hmac_bot_token", |b| {
        b.iter(|| black_box(local.validate(&hmac).is_valid()))
    });

    let tampered = raw.replace("auth_date=", "auth_date=9");
    let rejected = ValidationRequest::new(&tampered, BOT_ID, Environment::Production);
    group.bench_function("ed25519_rejected", |b| {
        b.iter(|| black_box(local.validate(&rejected).is_valid()))
    });

    group.finish();
}

pub fn bench_batch_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("initdata-batch");
    group.measurement_time(Duration::from_secs(10));

    for size in [10, 100, 1000] {
        let items = mixed_batch(size);
        group.throughput(Throughput::Elements(size as u64));

        let parallel = local_service(NOW);
        group.bench_with_input(BenchmarkId::new("parallel", size), &items, |b, items| {
            b.iter(|| black_box(parallel.validate_batch(items, FailureMode::ContinueOnFail)))
        });

        let sequential = local_service(NOW).with_parallelism(false);
        group.bench_with_input(BenchmarkId::new("sequential", size), &items, |b, items| {
            b.iter(|| black_box(sequential.validate_batch(items, FailureMode::ContinueOnFail)))
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_parse_and_canonicalize(c);
    bench_single_validation(c);
    bench_batch_validation(c);
}
