// src/config/validate.rs

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::plan::{ChecksetPlan, invocation_for, resolve};
use crate::errors::{ChecksetError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ChecksetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.check, raw.checkset))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_checks(cfg)?;
    validate_checks(cfg)?;
    validate_checksets(cfg)?;
    Ok(())
}

fn ensure_has_checks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.check.is_empty() {
        return Err(ChecksetError::ConfigError(
            "config must contain at least one [check.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_checks(cfg: &RawConfigFile) -> Result<()> {
    let no_params = BTreeMap::new();
    for (name, check) in &cfg.check {
        invocation_for(name, check, &no_params)?;
    }
    Ok(())
}

fn validate_checksets(cfg: &RawConfigFile) -> Result<()> {
    for (name, checkset) in &cfg.checkset {
        if checkset.chains.is_empty() {
            return Err(ChecksetError::ConfigError(format!(
                "checkset '{name}' has no chains"
            )));
        }
        let plan = resolve(name, checkset, &cfg.check)?;
        warn_about_unreachable(&plan);
    }
    Ok(())
}

/// Cycles and dangling dependencies are not fatal: the affected chains are
/// reported as unreachable when the checkset runs.
fn warn_about_unreachable(plan: &ChecksetPlan) {
    let graph = plan.graph();

    for task in graph.tasks() {
        for missing in graph.missing_dependencies_of(task) {
            warn!(
                checkset = %plan.name,
                task,
                dependency = missing,
                "chain depends on a chain this checkset does not define"
            );
        }
    }

    let cyclic = graph.cyclic_tasks();
    if !cyclic.is_empty() {
        warn!(checkset = %plan.name, tasks = ?cyclic, "dependency cycle between chains");
    }
}
