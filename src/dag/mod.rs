// src/dag/mod.rs

//! Task graph representation and the per-run state machine.
//!
//! - [`graph`] holds the dependency graph, including cycle and missing
//!   dependency detection.
//! - [`scheduler`] contains the state machine that decides which tasks are
//!   ready, records outcomes, and skips what can no longer run.
//! - [`task_info`] provides task states, skip reasons and scheduled tasks.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] implements the individual state transitions.
//! - [`run_result`] is the final partition handed back to callers.

pub mod graph;
pub mod run_result;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::DagGraph;
pub use run_result::RunResult;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, SkipReason, TaskState, Unreachable};
