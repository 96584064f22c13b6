// src/config/mod.rs

//! Configuration loading and validation for checkset.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Read and parse config text (`loader.rs`).
//! - Validate structural invariants (`validate.rs`).
//! - Expand `${key}` placeholders (`substitute.rs`).
//! - Resolve one named checkset into concrete tasks (`plan.rs`).

pub mod loader;
pub mod model;
pub mod plan;
pub mod substitute;
pub mod validate;

pub use loader::{
    DEFAULT_CONFIG_NAME, default_config_path, load_and_validate, load_from_path, parse_and_validate,
};
pub use model::{CheckConfig, ChecksetConfig, ConfigFile, ConfigSection, RawConfigFile};
pub use plan::{ChecksetPlan, PlannedTask};
pub use substitute::substitute;
