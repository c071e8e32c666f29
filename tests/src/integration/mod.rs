//! # Integration Tests
//!
//! - `reference` - Real Telegram-issued init data against the published keys
//! - `flows` - Batch, host adapter and runtime flows on locally signed data

pub mod flows;
