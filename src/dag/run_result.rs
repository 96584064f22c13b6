// src/dag/run_result.rs

use std::collections::BTreeSet;

use crate::engine::TaskName;

/// Final partition of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub completed: BTreeSet<TaskName>,
    pub failed: BTreeSet<TaskName>,
    /// Every skipped task, whatever the reason.
    pub skipped: BTreeSet<TaskName>,
    /// The subset of `skipped` that could never become ready.
    pub unreachable: BTreeSet<TaskName>,
    /// Tasks left non-terminal. Empty for a run that was driven to the end.
    pub unfinished: BTreeSet<TaskName>,
}

impl RunResult {
    /// A run passes when every task completed.
    ///
    /// A skipped task always traces back to a failure or to an unreachable
    /// task, so either one fails the run.
    pub fn passed(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && self.unfinished.is_empty()
    }

    /// Skipped tasks whose cause is an upstream failure.
    pub fn skipped_due_to_failure(&self) -> impl Iterator<Item = &TaskName> {
        self.skipped.difference(&self.unreachable)
    }

    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.skipped.len() + self.unfinished.len()
    }
}
