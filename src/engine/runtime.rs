// src/engine/runtime.rs

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::dag::{RunResult, ScheduledTask, Scheduler, Unreachable};
use crate::errors::{ChecksetError, Result};
use crate::exec::{Check, CheckContext};
use crate::shardlog::{ShardLogger, style};

use super::{Checkset, RuntimeOptions, TaskName, TaskOutcome};

/// Drives the DAG scheduler for one checkset run.
///
/// Ready checks run on Tokio's blocking pool, one thread each, so they run
/// in parallel and every check logs from its own shard. The loop itself
/// only suspends in `JoinSet::join_next`, waiting for whichever check
/// finishes first.
pub struct Runtime {
    name: String,
    scheduler: Scheduler,
    checks: BTreeMap<TaskName, Arc<dyn Check>>,
    params: Arc<BTreeMap<String, String>>,
    logger: Arc<ShardLogger>,
    options: RuntimeOptions,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("name", &self.name)
            .field("scheduler", &self.scheduler)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(checkset: Checkset, logger: Arc<ShardLogger>, options: RuntimeOptions) -> Self {
        let scheduler = Scheduler::from_checkset(&checkset);
        let params = Arc::new(checkset.params().clone());
        let checks = checkset
            .tasks()
            .iter()
            .map(|(name, spec)| (name.clone(), Arc::clone(&spec.check)))
            .collect();

        Self {
            name: checkset.name().to_string(),
            scheduler,
            checks,
            params,
            logger,
            options,
        }
    }

    /// Run every task to a terminal state and return the partition.
    ///
    /// Check failures never surface as `Err`. Infrastructure faults do: a
    /// worker that could not be joined, or a check reporting
    /// [`TaskOutcome::Fault`]. On a fault, checks still in flight are
    /// abandoned and nothing further is dispatched.
    pub async fn run(mut self) -> Result<RunResult> {
        info!(checkset = %self.name, tasks = self.checks.len(), "checkset runtime started");
        self.logger.log(format!(
            "Scheduling {} check(s) of {}.",
            self.checks.len(),
            self.name
        ));

        let mut in_flight: JoinSet<(TaskName, TaskOutcome)> = JoinSet::new();

        loop {
            let capacity = match self.options.max_workers {
                Some(n) => n.get().saturating_sub(in_flight.len()),
                None => usize::MAX,
            };

            for task in self.scheduler.collect_ready(Some(capacity)) {
                self.dispatch(&mut in_flight, task);
            }

            if in_flight.is_empty() {
                if !self.scheduler.is_finished() {
                    let unreachable = self.scheduler.skip_unreachable();
                    self.report_unreachable(&unreachable);
                }
                break;
            }

            match in_flight.join_next().await {
                Some(Ok((name, outcome))) => {
                    if let Err(e) = self.record(&name, outcome) {
                        in_flight.abort_all();
                        return Err(e);
                    }
                }
                Some(Err(e)) => {
                    in_flight.abort_all();
                    return Err(anyhow!("check worker could not be joined: {e}").into());
                }
                None => break,
            }
        }

        let result = self.scheduler.result();
        self.report_skipped(&result);
        info!(
            completed = result.completed.len(),
            failed = result.failed.len(),
            skipped = result.skipped.len(),
            "checkset runtime finished"
        );
        Ok(result)
    }

    fn dispatch(&self, in_flight: &mut JoinSet<(TaskName, TaskOutcome)>, task: ScheduledTask) {
        let name = task.name;
        debug!(task = %name, dispatch_index = task.dispatch_index, "dispatching check");

        let Some(check) = self.checks.get(&name).cloned() else {
            // Only reachable if the checkset and scheduler disagree.
            in_flight.spawn(async move {
                let outcome = TaskOutcome::failed("no check registered for this task");
                (name, outcome)
            });
            return;
        };

        let logger = Arc::clone(&self.logger);
        let params = Arc::clone(&self.params);

        in_flight.spawn_blocking(move || {
            logger.log(format!("Running {name}."));

            let ctx = CheckContext {
                task: &name,
                logger: &logger,
                params: &params,
            };
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| check.execute(&ctx))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    TaskOutcome::failed(format!("check panicked: {}", panic_message(&*payload)))
                }
            };

            (name, outcome)
        });
    }

    fn record(&mut self, name: &str, outcome: TaskOutcome) -> Result<()> {
        match &outcome {
            TaskOutcome::Success => {}
            TaskOutcome::Failed(diagnostic) => {
                self.logger
                    .log_main(style::task_failed_message(name, diagnostic));
            }
            TaskOutcome::Fault(message) => {
                error!(task = name, %message, "check fault; aborting run");
                self.logger
                    .log_main(style::task_failed_message(name, message));
                self.scheduler.handle_completion(name, &outcome);
                return Err(ChecksetError::CheckFault {
                    task: name.to_string(),
                    message: message.clone(),
                });
            }
        }

        let step = self.scheduler.handle_completion(name, &outcome);
        if !step.newly_skipped.is_empty() {
            debug!(task = name, skipped = ?step.newly_skipped, "dependents skipped");
        }
        Ok(())
    }

    fn report_unreachable(&self, unreachable: &[(TaskName, Unreachable)]) {
        if unreachable.is_empty() {
            return;
        }

        self.logger.log_main(style::warning(&format!(
            "{} check(s) can never run (unreachable).",
            unreachable.len()
        )));
        for (name, reason) in unreachable {
            self.logger.log_main(format!("  - {name}: {reason}"));
        }
    }

    fn report_skipped(&self, result: &RunResult) {
        let skipped: Vec<&TaskName> = result.skipped_due_to_failure().collect();
        if skipped.is_empty() {
            return;
        }

        self.logger.log_main(style::warning(&format!(
            "Skipped {} check(s) due to failed dependencies.",
            skipped.len()
        )));
        for name in skipped {
            self.logger.log_main(format!("  - {name}"));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
