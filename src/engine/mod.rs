// src/engine/mod.rs

//! Orchestration engine for checkset runs.
//!
//! This module ties together:
//! - the checkset (task graph + one [`crate::exec::Check`] per task)
//! - the pure DAG scheduler from [`crate::dag`]
//! - the async runtime that runs ready checks on blocking worker threads
//!   and feeds their outcomes back into the scheduler
//!
//! The pure state machine lives in [`crate::dag::Scheduler`]; the async/IO
//! shell is implemented in [`runtime`].

use std::num::NonZeroUsize;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of one check execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Failure with a human-readable diagnostic.
    Failed(String),
    /// The check could not do its bookkeeping (e.g. a stamp write failed).
    /// Fatal to the whole run.
    Fault(String),
}

impl TaskOutcome {
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        TaskOutcome::Failed(diagnostic.into())
    }

    pub fn fault(message: impl Into<String>) -> Self {
        TaskOutcome::Fault(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Upper bound on checks running at once. `None` leaves concurrency to
    /// Tokio's blocking pool.
    pub max_workers: Option<NonZeroUsize>,
}

pub mod checkset;
pub mod runtime;

pub use checkset::{Checkset, TaskSpec};
pub use runtime::Runtime;
