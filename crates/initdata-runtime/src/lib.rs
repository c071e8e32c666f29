//! # Init-Data Guard Runtime
//!
//! Configuration and batch runner behind the `initdata-guard` binary.
//!
//! - `config` - Defaults, `IDG_*` environment variables and CLI overrides
//! - `runner` - JSON in, validation reports out

pub mod config;
pub mod runner;

pub use config::{ConfigError, Overrides, RuntimeConfig};
pub use runner::{build_adapter, run_batch, RunError};
