// src/engine/checkset.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::dag::DagGraph;
use crate::engine::TaskName;
use crate::exec::Check;

/// One task of a checkset: what to run and what must complete first.
#[derive(Clone)]
pub struct TaskSpec {
    pub deps: Vec<TaskName>,
    pub check: Arc<dyn Check>,
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("deps", &self.deps)
            .field("check", &self.check.describe())
            .finish()
    }
}

/// A named collection of tasks run together for one workflow invocation.
///
/// Built once before scheduling and never mutated during a run.
#[derive(Debug, Clone, Default)]
pub struct Checkset {
    name: String,
    params: BTreeMap<String, String>,
    tasks: BTreeMap<TaskName, TaskSpec>,
}

impl Checkset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parameters handed to every check through its context.
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Add (or replace) a task.
    pub fn with_task<I, S>(mut self, name: impl Into<TaskName>, deps: I, check: Arc<dyn Check>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.insert(name, deps, check);
        self
    }

    pub fn insert<I, S>(&mut self, name: impl Into<TaskName>, deps: I, check: Arc<dyn Check>)
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let deps = deps.into_iter().map(Into::into).collect();
        self.tasks.insert(name.into(), TaskSpec { deps, check });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskSpec> {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Dependency graph over the task names.
    pub fn graph(&self) -> DagGraph {
        DagGraph::new(
            self.tasks
                .iter()
                .map(|(name, spec)| (name.clone(), spec.deps.clone())),
        )
    }
}
