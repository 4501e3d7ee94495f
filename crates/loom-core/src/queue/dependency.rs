//! Dependency graph for one priority bucket.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on (waits for)
//! - Reverse edges: task -> tasks that depend on it (waiting tasks)
//! - Invariant: edges and reverse_edges must be kept in sync
//! - Only dependencies inside the batch become edges. A dependency outside
//!   the batch is judged once, against the pass-start snapshot: if it was
//!   not completed the node is deferred and never becomes ready this pass.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::{Task, TaskId, TaskStatus};

/// Dependency graph for tracking task dependencies.
///
/// This graph maintains both forward and reverse edges for efficient lookups:
/// - `edges`: TaskId -> Set of unresolved TaskIds it depends on
/// - `reverse_edges`: TaskId -> Set of TaskIds waiting for it
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Every task in the batch.
    nodes: BTreeSet<TaskId>,

    /// Forward edges: task -> tasks it depends on (waits for)
    edges: HashMap<TaskId, HashSet<TaskId>>,

    /// Reverse edges: task -> tasks that depend on it (waiting tasks)
    reverse_edges: HashMap<TaskId, HashSet<TaskId>>,

    /// Blocked by an out-of-batch dependency.
    deferred: HashSet<TaskId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `batch`.
    ///
    /// `statuses` is the status of every stored task at pass start.
    pub fn for_batch(batch: &[Task], statuses: &HashMap<TaskId, TaskStatus>) -> Self {
        let mut graph = Self::new();
        graph.nodes.extend(batch.iter().map(Task::id));

        for task in batch {
            for &dep in task.dependencies() {
                if graph.nodes.contains(&dep) {
                    graph.add_dependency(task.id(), dep);
                } else if let Some(status) = statuses.get(&dep)
                    && *status != TaskStatus::Completed
                {
                    graph.deferred.insert(task.id());
                }
            }
        }
        graph
    }

    /// Add a dependency: `task` depends on `depends_on`.
    ///
    /// Example: add_dependency(task_b, task_a) means "B waits for A"
    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) {
        self.nodes.insert(task);
        self.nodes.insert(depends_on);
        self.edges.entry(task).or_default().insert(depends_on);
        self.reverse_edges
            .entry(depends_on)
            .or_default()
            .insert(task);
    }

    /// Remove a dependency: `task` no longer depends on `depends_on`.
    pub fn remove_dependency(&mut self, task: TaskId, depends_on: TaskId) {
        if let Entry::Occupied(mut e) = self.edges.entry(task) {
            e.get_mut().remove(&depends_on);
            if e.get().is_empty() {
                e.remove_entry();
            }
        }
        if let Entry::Occupied(mut e) = self.reverse_edges.entry(depends_on) {
            e.get_mut().remove(&task);
            if e.get().is_empty() {
                e.remove_entry();
            }
        }
    }

    /// Tasks waiting for `task`, ascending.
    pub fn get_waiting_tasks(&self, task: TaskId) -> Vec<TaskId> {
        let mut waiting: Vec<TaskId> = self
            .reverse_edges
            .get(&task)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default();
        waiting.sort();
        waiting
    }

    pub fn has_dependencies(&self, task: TaskId) -> bool {
        self.edges
            .get(&task)
            .map(|deps| !deps.is_empty())
            .unwrap_or(false)
    }

    /// Unresolved dependencies of a task, ascending.
    pub fn get_dependencies(&self, task: TaskId) -> Vec<TaskId> {
        let mut deps: Vec<TaskId> = self
            .edges
            .get(&task)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    pub fn is_deferred(&self, task: TaskId) -> bool {
        self.deferred.contains(&task)
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn is_ready(&self, task: TaskId) -> bool {
        !self.has_dependencies(task) && !self.is_deferred(task)
    }

    /// Nodes that can run now, ascending by id.
    pub fn ready(&self) -> Vec<TaskId> {
        self.nodes
            .iter()
            .copied()
            .filter(|&id| self.is_ready(id))
            .collect()
    }

    /// `task` has been processed: drop it from its dependents and return the
    /// dependents that just became ready, ascending.
    pub fn resolve(&mut self, task: TaskId) -> Vec<TaskId> {
        let mut newly_ready = Vec::new();
        for waiting in self.get_waiting_tasks(task) {
            self.remove_dependency(waiting, task);
            if self.is_ready(waiting) {
                newly_ready.push(waiting);
            }
        }
        newly_ready
    }
}
