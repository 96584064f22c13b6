// src/logging.rs

//! Diagnostic logging for `checkset` using `tracing` + `tracing-subscriber`.
//!
//! Diagnostics go to STDERR. STDOUT belongs to the shard log
//! ([`crate::shardlog`]), which is the user-facing record of a run.
//!
//! The filter is picked as follows:
//! 1. `--log-level` CLI flag, applied to every target;
//! 2. `CHECKSET_LOG`, any `EnvFilter` directive string
//!    (e.g. `info` or `warn,checkset::engine=debug`);
//! 3. `warn`.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "CHECKSET_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(directive_for(lvl)),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn directive_for(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
