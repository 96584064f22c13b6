// tests/scheduler_properties.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use checkset::dag::{DagGraph, Scheduler, TaskState};
use checkset::engine::TaskOutcome;

/// Arbitrary task graph over `task_0..task_{n-1}`.
///
/// Dependencies are drawn from `0..=n`; index `n` names a task that does not
/// exist, and back edges produce cycles, so every flavour of unreachable task
/// shows up.
fn graph_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(0..=n, 0..3), n)
    })
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

fn build_graph(deps: &[Vec<usize>]) -> DagGraph {
    DagGraph::new(
        deps.iter()
            .enumerate()
            .map(|(i, ds)| (name(i), ds.iter().map(|&d| name(d)).collect::<Vec<_>>())),
    )
}

/// Transitive dependents of `task` according to the declared edges.
fn dependents_closure(deps: &[Vec<usize>], task: usize) -> BTreeSet<usize> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![task];
    while let Some(t) = stack.pop() {
        for (i, ds) in deps.iter().enumerate() {
            if ds.contains(&t) && seen.insert(i) {
                stack.push(i);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn scheduler_terminates_and_respects_dependencies(
        deps in graph_strategy(8),
        failing in proptest::collection::hash_set(0..8usize, 0..3),
        picks in proptest::collection::vec(any::<usize>(), 0..64),
        limit in proptest::option::of(1..4usize),
    ) {
        let n = deps.len();
        let mut scheduler = Scheduler::new(build_graph(&deps));
        let failing: HashSet<String> = failing.into_iter().filter(|&i| i < n).map(name).collect();

        let mut running: Vec<String> = Vec::new();
        let mut dispatched: HashSet<String> = HashSet::new();
        let mut picks = picks.into_iter();
        let mut steps = 0;

        loop {
            steps += 1;
            prop_assert!(steps < 1000, "scheduler did not converge");

            let room = limit.map(|l| l.saturating_sub(running.len()));
            for task in scheduler.collect_ready(room) {
                // Safety: a task is only handed out once every dependency completed.
                let idx: usize = task.name["task_".len()..].parse().unwrap();
                for &d in &deps[idx] {
                    prop_assert_eq!(scheduler.state_of(&name(d)), Some(TaskState::Completed));
                }
                prop_assert!(dispatched.insert(task.name.clone()), "{} dispatched twice", task.name);
                running.push(task.name);
            }
            if let Some(l) = limit {
                prop_assert!(running.len() <= l);
            }

            if running.is_empty() {
                if !scheduler.is_finished() {
                    scheduler.skip_unreachable();
                }
                break;
            }

            let at = picks.next().unwrap_or(0) % running.len();
            let task = running.swap_remove(at);
            let outcome = if failing.contains(&task) {
                TaskOutcome::failed("scripted failure")
            } else {
                TaskOutcome::Success
            };
            scheduler.handle_completion(&task, &outcome);
        }

        // Termination: every task ends in a terminal state.
        prop_assert!(scheduler.is_finished());
        let result = scheduler.result();
        prop_assert!(result.unfinished.is_empty());
        prop_assert_eq!(result.total(), n);

        // Failure propagation: nothing downstream of a failure completed or ran.
        for failed in &result.failed {
            let idx: usize = failed["task_".len()..].parse().unwrap();
            for dependent in dependents_closure(&deps, idx) {
                let dependent = name(dependent);
                prop_assert_eq!(scheduler.state_of(&dependent), Some(TaskState::Skipped));
                prop_assert!(!dispatched.contains(&dependent));
            }
        }

        // Only failures and unreachability skip anything.
        if result.failed.is_empty() {
            prop_assert_eq!(&result.skipped, &result.unreachable);
        }

        prop_assert_eq!(result.passed(), result.completed.len() == n);
    }
}

#[test]
fn completion_for_task_that_is_not_running_is_ignored() {
    let mut scheduler = Scheduler::new(DagGraph::new([
        ("A".to_string(), Vec::<String>::new()),
        ("B".to_string(), vec!["A".to_string()]),
    ]));

    let step = scheduler.handle_completion("B", &TaskOutcome::Success);
    assert!(step.newly_completed.is_none());
    assert_eq!(scheduler.state_of("B"), Some(TaskState::Pending));

    let step = scheduler.handle_completion("nope", &TaskOutcome::Success);
    assert!(step.newly_completed.is_none());
}

#[test]
fn collect_ready_honours_limit_and_dispatch_order() {
    let mut scheduler = Scheduler::new(DagGraph::new(
        ["A", "B", "C"].map(|n| (n.to_string(), Vec::<String>::new())),
    ));

    let first = scheduler.collect_ready(Some(2));
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].dispatch_index, 0);
    assert_eq!(first[1].dispatch_index, 1);
    assert_eq!(scheduler.running_count(), 2);

    let rest = scheduler.collect_ready(None);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].dispatch_index, 2);
    assert!(scheduler.collect_ready(None).is_empty());
}

#[test]
fn skip_unreachable_waits_for_running_tasks() {
    let mut scheduler = Scheduler::new(DagGraph::new([
        ("A".to_string(), Vec::<String>::new()),
        ("B".to_string(), vec!["ghost".to_string()]),
    ]));

    let ready = scheduler.collect_ready(None);
    assert_eq!(ready.len(), 1);
    assert!(scheduler.skip_unreachable().is_empty());

    scheduler.handle_completion("A", &TaskOutcome::Success);
    let skipped = scheduler.skip_unreachable();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, "B");
    assert!(scheduler.is_finished());
}
