use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::run_result::RunResult;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{ScheduledTask, SkipReason, TaskInfo, TaskState, Unreachable};
use crate::engine::{Checkset, TaskName, TaskOutcome};

/// Scheduler holds the immutable task graph plus the mutable state of one
/// run.
///
/// It is a pure state machine: it never executes anything. The async
/// [`crate::engine::Runtime`] asks it which tasks are ready, runs them, and
/// reports outcomes back. It is responsible for:
/// - deciding when a task is ready (all deps completed)
/// - marking tasks as completed/failed
/// - skipping the transitive dependents of a failed task
/// - detecting tasks that can never become ready
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: BTreeMap<TaskName, TaskInfo>,
    /// Number of tasks handed out so far.
    dispatched: usize,
}

impl Scheduler {
    /// Construct a scheduler for the given graph; every task starts `Pending`.
    pub fn new(graph: DagGraph) -> Self {
        let tasks = graph
            .tasks()
            .map(|name| {
                let deps = graph.dependencies_of(name).to_vec();
                (name.to_string(), TaskInfo::new(name.to_string(), deps))
            })
            .collect();

        Self {
            graph,
            tasks,
            dispatched: 0,
        }
    }

    /// Construct a scheduler for the task graph of a [`Checkset`].
    pub fn from_checkset(checkset: &Checkset) -> Self {
        Self::new(checkset.graph())
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Task names in sorted order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Current state of `task`, or `None` if the task is unknown.
    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.tasks.get(task).map(|info| info.state)
    }

    /// Why `task` was skipped, if it was.
    pub fn skip_reason_of(&self, task: &str) -> Option<&SkipReason> {
        self.tasks.get(task)?.skip_reason.as_ref()
    }

    /// Whether the dependencies of `task` are satisfied right now.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        let mgr = ReadOnlyStateManager::new(&self.tasks);
        Some(mgr.deps_satisfied_for_info(info))
    }

    /// Number of tasks currently `Running`.
    pub fn running_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|info| info.state == TaskState::Running)
            .count()
    }

    /// Whether every task has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.tasks.values().all(|info| info.state.is_terminal())
    }

    /// Mark ready tasks `Running` and return them.
    ///
    /// `limit` caps how many tasks are handed out by this call; `None`
    /// returns every ready task.
    pub fn collect_ready(&mut self, limit: Option<usize>) -> Vec<ScheduledTask> {
        let limit = limit.unwrap_or(usize::MAX);
        if limit == 0 {
            return Vec::new();
        }

        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        manager.collect_new_ready_tasks(limit, &mut self.dispatched)
    }

    /// Record the outcome of a running task.
    pub fn handle_completion(&mut self, task: &str, outcome: &TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task, "completion for unknown task; ignoring");
            return step;
        };

        if info.state != TaskState::Running {
            warn!(task, state = ?info.state, "completion for task that is not running; ignoring");
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                info.state = TaskState::Completed;
                debug!(task, "task completed successfully");
                step.newly_completed = Some(task.to_string());
            }
            TaskOutcome::Failed(diagnostic) | TaskOutcome::Fault(diagnostic) => {
                info.state = TaskState::Failed;
                info.diagnostic = Some(diagnostic.clone());
                warn!(task, %diagnostic, "task failed; skipping dependents");
                step.newly_failed = Some(task.to_string());

                let mut manager = StateManager::new(&self.graph, &mut self.tasks);
                step.newly_skipped = manager.mark_dependents_skipped(task);
            }
        }

        step.run_just_finished = self.is_finished();
        if step.run_just_finished {
            info!("scheduler: all tasks terminal");
        }
        step
    }

    /// Skip every pending task as unreachable.
    ///
    /// The caller must only do this once nothing is running and
    /// [`Scheduler::collect_ready`] returns nothing.
    pub fn skip_unreachable(&mut self) -> Vec<(TaskName, Unreachable)> {
        if self.running_count() > 0 {
            warn!("skip_unreachable called while tasks are running; ignoring");
            return Vec::new();
        }

        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        manager.mark_pending_unreachable()
    }

    /// Partition of all tasks by terminal state.
    pub fn result(&self) -> RunResult {
        let mut result = RunResult::default();

        for info in self.tasks.values() {
            let name = info.name.clone();
            match info.state {
                TaskState::Completed => {
                    result.completed.insert(name);
                }
                TaskState::Failed => {
                    result.failed.insert(name);
                }
                TaskState::Skipped => {
                    if matches!(info.skip_reason, Some(SkipReason::Unreachable(_))) {
                        result.unreachable.insert(name.clone());
                    }
                    result.skipped.insert(name);
                }
                TaskState::Pending | TaskState::Running => {
                    result.unfinished.insert(name);
                }
            }
        }

        result
    }
}
