//! # Init-Data Guard
//!
//! Validates Telegram Mini App init data in batches.
//!
//! ## Usage
//!
//! ```text
//! initdata-guard items.json
//! cat items.json | initdata-guard --failure-mode stop
//! ```
//!
//! Each work item is `{ "initData": "...", "botId": 123, "isTestEnvironment": false }`
//! with optional `maxAgeSecs` and `botToken`. One report per item is written
//! to stdout.
//!
//! ## Exit Codes
//!
//! - `0` - Every item was processed (some may be invalid)
//! - `1` - Configuration, input or I/O error
//! - `2` - A stop-on-fail batch aborted on an invalid item

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use initdata_runtime::{run_batch, Overrides, RunError, RuntimeConfig};
use initdata_verification::{FixedClock, SystemClock, ValidationReport};

#[derive(Parser, Debug)]
#[command(name = "initdata-guard")]
#[command(about = "Validate Telegram Mini App init data")]
struct Args {
    /// JSON file with work items; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Maximum init data age in seconds (0 disables the check)
    #[arg(long)]
    max_age_secs: Option<u64>,

    /// Tolerated clock skew for auth_date in the future
    #[arg(long)]
    max_future_skew_secs: Option<u64>,

    /// Signature to verify: auto, third-party or bot-token
    #[arg(long)]
    scheme: Option<String>,

    /// What to do on an invalid item: continue or stop
    #[arg(long)]
    failure_mode: Option<String>,

    /// Validate items one after another on the current thread
    #[arg(long)]
    sequential: bool,

    /// Largest accepted batch
    #[arg(long)]
    max_items: Option<usize>,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Validate as of this Unix time instead of the system clock
    #[arg(long)]
    now: Option<u64>,

    /// Pretty-print the reports
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_age_secs: self.max_age_secs,
            max_future_skew_secs: self.max_future_skew_secs,
            scheme: self.scheme.clone(),
            failure_mode: self.failure_mode.clone(),
            sequential: self.sequential,
            max_items: self.max_items,
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let mut config = RuntimeConfig::from_env().context("Invalid IDG_* environment")?;
    config
        .apply_overrides(&args.overrides())
        .context("Invalid command-line option")?;
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let input = read_input(args.input.as_deref())?;

    let result = match args.now {
        Some(now) => run_batch(&config, FixedClock(now), &input),
        None => run_batch(&config, SystemClock, &input),
    };

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    report_outcome(result, args.pretty, &mut stdout.lock(), &mut stderr.lock())
}

/// Write reports to `out`, or the abort error to `err`, and pick the exit code.
///
/// The abort error is written whether or not logging is enabled.
fn report_outcome(
    result: Result<Vec<ValidationReport>, RunError>,
    pretty: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<ExitCode> {
    match result {
        Ok(reports) => {
            write_reports(out, &reports, pretty)?;
            info!(items = reports.len(), "Done");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_abort() => {
            error!(error = %e, "Batch aborted");
            writeln!(err, "Error: {e}")?;
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e).context("Failed to process input"),
    }
}

fn read_input(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_reports(out: &mut impl Write, reports: &[ValidationReport], pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, reports)?;
    } else {
        serde_json::to_writer(&mut *out, reports)?;
    }
    writeln!(out)?;
    Ok(())
}
