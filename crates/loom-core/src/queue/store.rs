//! In-memory task store.
//!
//! Tasks are never deleted. Ordered by id so snapshots come out in
//! submission order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{LoomError, Task, TaskId, TaskStatus};
use crate::observability::QueueCounts;

/// Store shared between the engine (submit/query) and the scheduler.
///
/// The lock is only held for bookkeeping, never across an executor await.
pub type SharedStore = Arc<Mutex<TaskStore>>;

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Insert a new task. Ids come from the allocator, so a collision is a bug
    /// in the caller; the existing task is kept.
    pub fn insert(&mut self, task: Task) {
        self.tasks.entry(task.id()).or_insert(task);
    }

    pub fn get(&self, id: TaskId) -> Result<&Task, LoomError> {
        self.tasks.get(&id).ok_or(LoomError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Clones of every pending task, ascending by id.
    pub fn pending(&self) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.status() == TaskStatus::Pending)
            .cloned()
            .collect()
    }

    /// Status of every task at this instant.
    pub fn statuses(&self) -> HashMap<TaskId, TaskStatus> {
        self.tasks.iter().map(|(id, t)| (*id, t.status())).collect()
    }

    pub fn counts(&self) -> QueueCounts {
        let mut counts = QueueCounts::default();
        for task in self.tasks.values() {
            counts.record(task.status());
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskSubmission, TaskType};
    use chrono::Utc;
    use serde_json::json;

    fn task(id: u64, task_type: TaskType) -> Task {
        Task::new(
            TaskId::new(id),
            TaskSubmission::new(task_type, json!({})),
            5,
            Utc::now(),
        )
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = TaskStore::new();
        assert_eq!(
            store.get(TaskId::new(42)).unwrap_err(),
            LoomError::NotFound(TaskId::new(42))
        );
    }

    #[test]
    fn insert_keeps_first_task_for_an_id() {
        let mut store = TaskStore::new();
        store.insert(task(1, TaskType::Payment));
        store.insert(task(1, TaskType::Notification));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(TaskId::new(1)).unwrap().task_type(),
            TaskType::Payment
        );
    }

    #[test]
    fn pending_snapshot_is_ordered_and_filtered() {
        let mut store = TaskStore::new();
        store.insert(task(3, TaskType::Checkout));
        store.insert(task(1, TaskType::Payment));
        store.insert(task(2, TaskType::Notification));

        let now = Utc::now();
        let t2 = store.get_mut(TaskId::new(2)).unwrap();
        t2.start(now);
        t2.complete(now);

        let ids: Vec<_> = store.pending().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![TaskId::new(1), TaskId::new(3)]);

        let counts = store.counts();
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 3);
        assert!(!counts.is_settled());
        assert_eq!(store.statuses()[&TaskId::new(2)], TaskStatus::Completed);
    }
}
