// src/exec/check.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::TaskOutcome;
use crate::shardlog::ShardLogger;

/// What a running check gets to see.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Name of the task being executed.
    pub task: &'a str,
    /// Shared run log; lines are attributed to the worker thread's shard.
    pub logger: &'a ShardLogger,
    /// Checkset parameters (the `with` table of the checkset).
    pub params: &'a BTreeMap<String, String>,
}

/// A unit of work the scheduler can run.
///
/// `execute` is called on a dedicated blocking thread and may take as long
/// as it needs. Returning [`TaskOutcome::Failed`] and panicking are treated
/// the same by the scheduler. [`TaskOutcome::Fault`] ends the run.
pub trait Check: Send + Sync {
    fn execute(&self, ctx: &CheckContext<'_>) -> TaskOutcome;

    /// Short human-readable description for dry runs and diagnostics.
    fn describe(&self) -> String {
        String::from("<check>")
    }
}

/// Check backed by a closure.
pub struct FnCheck<F> {
    f: F,
    description: String,
}

impl<F> FnCheck<F>
where
    F: Fn(&CheckContext<'_>) -> TaskOutcome + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            description: String::from("<closure>"),
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<F> fmt::Debug for FnCheck<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCheck")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> Check for FnCheck<F>
where
    F: Fn(&CheckContext<'_>) -> TaskOutcome + Send + Sync,
{
    fn execute(&self, ctx: &CheckContext<'_>) -> TaskOutcome {
        (self.f)(ctx)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}
