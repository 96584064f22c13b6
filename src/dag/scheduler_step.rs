// src/dag/scheduler_step.rs

//! Result type for a single scheduler transition.

use crate::engine::TaskName;

/// What changed when an outcome was fed into the scheduler.
///
/// Useful for tests that step the scheduler by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// The task that moved to `Completed`, if the outcome was a success.
    pub newly_completed: Option<TaskName>,
    /// The task that moved to `Failed`, if the outcome was a failure.
    pub newly_failed: Option<TaskName>,
    /// Dependents that became `Skipped` because of that failure.
    pub newly_skipped: Vec<TaskName>,
    /// Whether every task is now terminal.
    pub run_just_finished: bool,
}
