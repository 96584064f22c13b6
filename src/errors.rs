// src/errors.rs

//! Error type for config loading, planning and run bookkeeping.
//!
//! Check failures are not errors: they are [`crate::engine::TaskOutcome`]
//! values. A [`ChecksetError`] means the run could not be set up or its
//! log could not be filed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecksetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The requested checkset matches no configured work.
    #[error("No checkset named `{0}` is configured.")]
    UnknownCheckset(String),

    /// A chain key, after substitution, is not a `[check.<name>]` section.
    #[error("checkset '{checkset}' chain '{chain}' does not name a [check.<name>] section")]
    UnknownCheck { checkset: String, chain: String },

    /// A `[check.<name>]` section without a usable command.
    #[error("check '{check}' {reason}")]
    InvalidCheck { check: String, reason: &'static str },

    /// A check hit an I/O fault that is not its own failure; the run stops.
    #[error("check '{task}' aborted the run: {message}")]
    CheckFault { task: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChecksetError {
    pub(crate) fn invalid_check(check: &str, reason: &'static str) -> Self {
        ChecksetError::InvalidCheck {
            check: check.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChecksetError>;
