// src/dag/state_manager.rs

//! Per-run state transitions for tasks in the scheduler.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::dag::task_info::{
    ScheduledTask, SkipReason, TaskInfo, TaskState, Unreachable,
};
use crate::engine::TaskName;

/// Mutating view over the scheduler's task table.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a DagGraph, tasks: &'a mut BTreeMap<TaskName, TaskInfo>) -> Self {
        Self { graph, tasks }
    }

    /// Collect up to `limit` pending tasks whose dependencies are satisfied,
    /// mark them `Running`, and return them in name order.
    ///
    /// `next_index` is the dispatch counter of the run; it is advanced for
    /// every task handed out.
    pub fn collect_new_ready_tasks(
        &mut self,
        limit: usize,
        next_index: &mut usize,
    ) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let candidates: Vec<TaskName> = {
            let ro = ReadOnlyStateManager::new(self.tasks);
            self.tasks
                .values()
                .filter(|info| info.state == TaskState::Pending && ro.deps_satisfied_for_info(info))
                .map(|info| info.name.clone())
                .take(limit)
                .collect()
        };

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                debug!(task = %info.name, "dependencies satisfied; marking Running");
                info.state = TaskState::Running;
                ready.push(ScheduledTask {
                    name,
                    dispatch_index: *next_index,
                });
                *next_index += 1;
            }
        }

        ready
    }

    /// Skip every pending task that transitively depends on `failed_task`.
    ///
    /// Returns the newly skipped tasks in discovery order.
    pub fn mark_dependents_skipped(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut visited: HashSet<TaskName> = HashSet::new();
        let mut newly_skipped = Vec::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let Some(info) = self.tasks.get_mut(&name) else {
                warn!(task = %name, "node in DAG not present in tasks map");
                continue;
            };

            match info.state {
                TaskState::Pending => {
                    info.skip(SkipReason::DependencyFailed {
                        upstream: failed_task.to_string(),
                    });
                    debug!(
                        task = %info.name,
                        upstream = failed_task,
                        "skipping dependent of failed task"
                    );
                    newly_skipped.push(name.clone());
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                }
                TaskState::Skipped => {
                    // Already skipped through another failed branch.
                }
                TaskState::Running | TaskState::Completed | TaskState::Failed => {
                    // Dependents never start before their deps finish.
                    warn!(
                        task = %info.name,
                        state = ?info.state,
                        "dependent of failed task already past Pending"
                    );
                }
            }
        }

        newly_skipped
    }

    /// Skip every remaining pending task as unreachable.
    ///
    /// Only meaningful when nothing is running and nothing is ready: at that
    /// point no pending task can ever become ready.
    pub fn mark_pending_unreachable(&mut self) -> Vec<(TaskName, Unreachable)> {
        let pending: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| info.state == TaskState::Pending)
            .map(|info| info.name.clone())
            .collect();

        if pending.is_empty() {
            return Vec::new();
        }

        let cyclic = self.graph.cyclic_tasks();
        let mut out = Vec::with_capacity(pending.len());

        for name in pending {
            let reason = if cyclic.contains(&name) {
                Unreachable::Cycle
            } else if let Some(missing) = self.graph.missing_dependencies_of(&name).first() {
                Unreachable::MissingDependency {
                    dependency: missing.to_string(),
                }
            } else {
                let upstream = self
                    .graph
                    .dependencies_of(&name)
                    .iter()
                    .find(|dep| {
                        self.tasks
                            .get(dep.as_str())
                            .is_some_and(|d| !matches!(d.state, TaskState::Completed))
                    })
                    .cloned()
                    .unwrap_or_default();
                Unreachable::BlockedByUnreachable { upstream }
            };

            if let Some(info) = self.tasks.get_mut(&name) {
                info!(task = %name, %reason, "task can never become ready");
                info.skip(SkipReason::Unreachable(reason.clone()));
            }
            out.push((name, reason));
        }

        out
    }
}

/// A read-only view for checking dependency satisfaction.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a BTreeMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a BTreeMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// Readiness predicate: every dependency is `Completed` (and therefore
    /// none is `Failed`). A dependency outside the task set is never
    /// satisfied.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| {
            self.tasks
                .get(dep_name)
                .is_some_and(|dep| dep.state == TaskState::Completed)
        })
    }
}
