// src/config/model.rs

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// tools_dir = "tooling-build"
/// findings_dir = "findings-build"
///
/// [check.format]
/// cmd = "python3 workflows/format.py -p ${platform}"
///
/// [checkset.linux]
/// with = { platform = "linux" }
///
/// [checkset.linux.chains]
/// "format" = []
/// ```
///
/// This is the unvalidated form; convert it into a [`ConfigFile`] with
/// `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All checks from `[check.<name>]`.
    #[serde(default)]
    pub check: BTreeMap<String, CheckConfig>,

    /// All checksets from `[checkset.<name>]`.
    #[serde(default)]
    pub checkset: BTreeMap<String, ChecksetConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (or
/// [`ConfigFile::new_unchecked`] for callers that validated themselves).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub check: BTreeMap<String, CheckConfig>,
    pub checkset: BTreeMap<String, ChecksetConfig>,
}

impl ConfigFile {
    pub fn new_unchecked(
        config: ConfigSection,
        check: BTreeMap<String, CheckConfig>,
        checkset: BTreeMap<String, ChecksetConfig>,
    ) -> Self {
        Self {
            config,
            check,
            checkset,
        }
    }

    pub fn checkset_names(&self) -> impl Iterator<Item = &str> {
        self.checkset.keys().map(String::as_str)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Stamp store and temporary run log, relative to the workdir.
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,

    /// Where checks leave durable artifacts and the final run log.
    #[serde(default = "default_findings_dir")]
    pub findings_dir: PathBuf,

    /// Upper bound on concurrently running checks; unbounded when absent.
    #[serde(default)]
    pub max_workers: Option<NonZeroUsize>,
}

fn default_tools_dir() -> PathBuf {
    PathBuf::from("tooling-build")
}

fn default_findings_dir() -> PathBuf {
    PathBuf::from("findings-build")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            tools_dir: default_tools_dir(),
            findings_dir: default_findings_dir(),
            max_workers: None,
        }
    }
}

/// `[check.<name>]` section.
///
/// Exactly one of `cmd` and `argv` must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Command line handed to the platform shell.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Program and arguments, executed without a shell.
    #[serde(default)]
    pub argv: Option<Vec<String>>,

    /// Stamp id; when set the check runs at most once per stamp window.
    #[serde(default)]
    pub stamp: Option<String>,
}

/// `[checkset.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ChecksetConfig {
    /// Parameters substituted into `${key}` placeholders.
    #[serde(default)]
    pub with: BTreeMap<String, String>,

    /// Chain name → names of the chains it waits for.
    #[serde(default)]
    pub chains: BTreeMap<String, Vec<String>>,
}
