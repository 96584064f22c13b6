// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::engine::TaskName;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies, in declaration order, without duplicates.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that list this one as a dependency.
    dependents: Vec<TaskName>,
}

/// In-memory dependency graph keyed by task name.
///
/// Unlike a validated DAG this tolerates dependencies on names outside the
/// task set and cycles; the scheduler needs to *see* those to report the
/// affected tasks as unreachable.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: BTreeMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Build a graph from `(task, dependencies)` pairs.
    pub fn new<I, D>(tasks: I) -> Self
    where
        I: IntoIterator<Item = (TaskName, D)>,
        D: IntoIterator<Item = TaskName>,
    {
        let mut nodes: BTreeMap<TaskName, DagNode> = BTreeMap::new();

        for (name, deps) in tasks {
            let mut unique = Vec::new();
            for dep in deps {
                if !unique.contains(&dep) {
                    unique.push(dep);
                }
            }
            nodes.entry(name).or_default().deps = unique;
        }

        // Second pass: populate dependents based on deps.
        let edges: Vec<(TaskName, TaskName)> = nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(|d| (d.clone(), name.clone())))
            .collect();
        for (dep, dependent) in edges {
            if let Some(dep_node) = nodes.get_mut(&dep) {
                dep_node.dependents.push(dependent);
            }
        }

        Self { nodes }
    }

    /// Return all task names, in sorted order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Dependencies of `name` that are not tasks of this graph.
    pub fn missing_dependencies_of(&self, name: &str) -> Vec<&str> {
        self.dependencies_of(name)
            .iter()
            .filter(|d| !self.contains(d))
            .map(|d| d.as_str())
            .collect()
    }

    /// Tasks that sit on a dependency cycle (including self-dependencies).
    pub fn cyclic_tasks(&self) -> BTreeSet<TaskName> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }
        for (name, node) in self.nodes.iter() {
            for dep in node.deps.iter().filter(|d| self.contains(d)) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        let mut cyclic = BTreeSet::new();
        for component in tarjan_scc(&graph) {
            let on_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.contains_edge(n, n));
            if on_cycle {
                cyclic.extend(component.into_iter().map(str::to_string));
            }
        }
        cyclic
    }
}
