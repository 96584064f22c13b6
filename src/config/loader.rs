// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// File name looked up in the working directory when `--config` is omitted.
pub const DEFAULT_CONFIG_NAME: &str = "Checkset.toml";

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

/// Deserialize TOML text into a [`RawConfigFile`]. Unknown keys are rejected;
/// nothing else is checked.
pub fn parse_raw(text: &str) -> Result<RawConfigFile> {
    Ok(toml::from_str(text)?)
}

/// Parse and validate config text that did not come from a file.
pub fn parse_and_validate(text: &str) -> Result<ConfigFile> {
    ConfigFile::try_from(parse_raw(text)?)
}

/// Read `path` and deserialize it. Read failures name the path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {}", path.display()))?;
    parse_raw(&text)
}

/// Read, deserialize and validate the config at `path`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}
