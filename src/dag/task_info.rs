// src/dag/task_info.rs

//! Task states and per-task bookkeeping.

use std::fmt;

use crate::engine::TaskName;

/// Lifecycle state of a task within one scheduler run.
///
/// `Pending -> Running -> {Completed, Failed}` or `Pending -> Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Skipped
        )
    }
}

/// Why a task was never run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A (possibly transitive) dependency failed.
    DependencyFailed { upstream: TaskName },
    /// The task can never satisfy its readiness condition.
    Unreachable(Unreachable),
}

/// Flavours of permanent unreadiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unreachable {
    /// The task lies on a dependency cycle.
    Cycle,
    /// A declared dependency is not part of the task set.
    MissingDependency { dependency: TaskName },
    /// A dependency is itself unreachable.
    BlockedByUnreachable { upstream: TaskName },
}

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unreachable::Cycle => f.write_str("part of a dependency cycle"),
            Unreachable::MissingDependency { dependency } => {
                write!(f, "depends on `{dependency}`, which is not in this checkset")
            }
            Unreachable::BlockedByUnreachable { upstream } => {
                write!(f, "waits on unreachable `{upstream}`")
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DependencyFailed { upstream } => {
                write!(f, "dependency `{upstream}` failed")
            }
            SkipReason::Unreachable(u) => u.fmt(f),
        }
    }
}

/// Static task information plus its state in the current run.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    /// Direct dependencies for this task.
    pub deps: Vec<TaskName>,
    pub state: TaskState,
    /// Set once the task is `Skipped`.
    pub skip_reason: Option<SkipReason>,
    /// Diagnostic of a `Failed` task.
    pub diagnostic: Option<String>,
}

impl TaskInfo {
    pub fn new(name: TaskName, deps: Vec<TaskName>) -> Self {
        Self {
            name,
            deps,
            state: TaskState::Pending,
            skip_reason: None,
            diagnostic: None,
        }
    }

    pub(crate) fn skip(&mut self, reason: SkipReason) {
        self.state = TaskState::Skipped;
        self.skip_reason = Some(reason);
    }
}

/// A task the scheduler wants executed now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    /// Position in dispatch order across the whole run (0-based).
    pub dispatch_index: usize,
}
