// src/cli.rs

//! CLI argument parsing using `clap`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `checkset`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "checkset",
    version,
    about = "Run named sets of checks as a concurrent dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Diagnostic logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHECKSET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a named checkset.
    Run(RunArgs),
    /// Report which findings were marked as passing.
    Findings(WorkdirArgs),
    /// Record or query a stamp in the tools cache.
    Stamp(StampArgs),
}

/// Options shared by every subcommand that works inside a project.
#[derive(Debug, Clone, Args)]
pub struct WorkdirArgs {
    /// Working directory; all configured paths are relative to it.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub workdir: PathBuf,

    /// Path to the config file (TOML), relative to the working directory.
    #[arg(short = 'c', long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,
}

impl WorkdirArgs {
    pub fn config_path(&self) -> PathBuf {
        self.workdir.join(&self.config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub location: WorkdirArgs,

    /// Which named checkset to run.
    #[arg(long = "checkset", visible_alias = "cs", value_name = "NAME")]
    pub checkset: String,

    /// Upper bound on concurrently running checks (overrides `[config].max_workers`).
    #[arg(long, value_name = "N")]
    pub max_workers: Option<NonZeroUsize>,

    /// Log every command before it runs.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only show command output when the command fails.
    #[arg(short, long)]
    pub suppress: bool,

    /// Parse + validate, print the task graph, but don't execute any checks.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StampArgs {
    #[command(flatten)]
    pub location: WorkdirArgs,

    /// Stamp identifier.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Only check freshness (exit status 1 when stale or missing).
    #[arg(long)]
    pub check: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
