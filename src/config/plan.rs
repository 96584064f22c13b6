// src/config/plan.rs

//! Resolution of one configured checkset into concrete tasks.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::config::model::{CheckConfig, ChecksetConfig, ConfigFile};
use crate::config::substitute::substitute;
use crate::dag::DagGraph;
use crate::engine::TaskName;
use crate::errors::{ChecksetError, Result};
use crate::exec::Invocation;

/// One chain of a checkset with every placeholder expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub deps: Vec<TaskName>,
    pub invocation: Invocation,
    pub stamp: Option<String>,
}

/// A checkset ready to be turned into an [`crate::engine::Checkset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksetPlan {
    pub name: String,
    pub params: BTreeMap<String, String>,
    pub tasks: BTreeMap<TaskName, PlannedTask>,
}

impl ChecksetPlan {
    pub fn graph(&self) -> DagGraph {
        DagGraph::new(
            self.tasks
                .iter()
                .map(|(name, task)| (name.clone(), task.deps.clone())),
        )
    }
}

impl ConfigFile {
    /// Resolve the checkset called `name`.
    ///
    /// Fails with [`ChecksetError::UnknownCheckset`] if no such checkset is
    /// configured.
    pub fn plan(&self, name: &str) -> Result<ChecksetPlan> {
        let checkset = self
            .checkset
            .get(name)
            .ok_or_else(|| ChecksetError::UnknownCheckset(name.to_string()))?;
        resolve(name, checkset, &self.check)
    }
}

pub(crate) fn resolve(
    name: &str,
    checkset: &ChecksetConfig,
    checks: &BTreeMap<String, CheckConfig>,
) -> Result<ChecksetPlan> {
    let params = &checkset.with;
    let mut tasks = BTreeMap::new();

    for (chain, deps) in &checkset.chains {
        let task_name = substitute(chain, params);
        let check = checks
            .get(&task_name)
            .ok_or_else(|| ChecksetError::UnknownCheck {
                checkset: name.to_string(),
                chain: task_name.clone(),
            })?;

        let planned = PlannedTask {
            deps: deps.iter().map(|d| substitute(d, params)).collect(),
            invocation: invocation_for(&task_name, check, params)?,
            stamp: check.stamp.as_deref().map(|s| substitute(s, params)),
        };

        match tasks.entry(task_name) {
            Entry::Vacant(slot) => {
                slot.insert(planned);
            }
            Entry::Occupied(slot) => {
                return Err(ChecksetError::ConfigError(format!(
                    "checkset '{name}' lists chain '{}' more than once",
                    slot.key()
                )));
            }
        }
    }

    Ok(ChecksetPlan {
        name: name.to_string(),
        params: params.clone(),
        tasks,
    })
}

pub(crate) fn invocation_for(
    check_name: &str,
    check: &CheckConfig,
    params: &BTreeMap<String, String>,
) -> Result<Invocation> {
    match (&check.cmd, &check.argv) {
        (Some(cmd), None) => Ok(Invocation::Shell(substitute(cmd, params))),
        (None, Some(argv)) if !argv.is_empty() => Ok(Invocation::Argv(
            argv.iter().map(|a| substitute(a, params)).collect(),
        )),
        (None, Some(_)) => Err(ChecksetError::invalid_check(check_name, "has an empty `argv`")),
        (Some(_), Some(_)) => Err(ChecksetError::invalid_check(
            check_name,
            "sets both `cmd` and `argv`",
        )),
        (None, None) => Err(ChecksetError::invalid_check(
            check_name,
            "needs either `cmd` or `argv`",
        )),
    }
}
