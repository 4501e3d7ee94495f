//! Task entity: identity, immutable submission data, and the mutable lifecycle.

use chrono::{DateTime, Utc};

use super::decision::{Decision, decide};
use super::ids::TaskId;
use super::submission::TaskSubmission;
use super::state::TaskStatus;
use super::task_type::TaskType;

pub const MAX_RETRY_REACHED: &str = "max retry limit reached";

/// A unit of work plus its lifecycle state.
///
/// Design:
/// - This is the "single source of truth" for task state.
/// - Everything except the lifecycle fields is fixed at creation.
/// - Lifecycle changes go through the `pub(crate)` transition methods, which
///   are only called by the task processor. Terminal states absorb every
///   transition.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    task_type: TaskType,
    priority: u32,
    dependencies: Vec<TaskId>,
    payload: serde_json::Value,
    callback: Option<String>,
    max_retry: u32,

    status: TaskStatus,
    retry_count: u32,
    message: String,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a pending task from an already validated submission.
    pub fn new(
        id: TaskId,
        submission: TaskSubmission,
        default_max_retry: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let mut dependencies = Vec::with_capacity(submission.dependencies.len());
        for dep in submission.dependencies {
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }

        Self {
            id,
            task_type: submission.task_type,
            priority: submission.task_type.priority(),
            dependencies,
            payload: submission.payload,
            callback: submission.callback,
            max_retry: submission.max_retry.unwrap_or(default_max_retry),
            status: TaskStatus::Pending,
            retry_count: 0,
            message: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retry
    }

    /// Pending -> InProgress.
    pub(crate) fn start(&mut self, now: DateTime<Utc>) {
        if self.status != TaskStatus::Pending {
            return;
        }
        self.status = TaskStatus::InProgress;
        self.updated_at = now;
    }

    /// InProgress -> Completed.
    pub(crate) fn complete(&mut self, now: DateTime<Utc>) {
        if self.status != TaskStatus::InProgress {
            return;
        }
        self.status = TaskStatus::Completed;
        self.updated_at = now;
    }

    /// Retries were already used up before this attempt: fail without running.
    pub(crate) fn exhaust(&mut self, now: DateTime<Utc>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.message = MAX_RETRY_REACHED.to_string();
        self.updated_at = now;
    }

    /// Stay pending because `dependency` is not completed. No retry is consumed.
    pub(crate) fn block_on(&mut self, dependency: TaskId, now: DateTime<Utc>) {
        if self.status != TaskStatus::Pending {
            return;
        }
        self.message = format!("waiting on dependency {dependency}");
        self.updated_at = now;
    }

    /// Count one failed attempt and move to Pending or Failed.
    ///
    /// Returns the decision that was applied, or `None` if the task was
    /// already terminal.
    pub(crate) fn record_failure(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Option<Decision> {
        if self.is_terminal() {
            return None;
        }
        self.retry_count += 1;
        self.message = message.into();
        self.updated_at = now;

        let decision = decide(self.retry_count, self.max_retry);
        self.status = match decision {
            Decision::MarkFailed => TaskStatus::Failed,
            Decision::Retry { .. } => TaskStatus::Pending,
        };
        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn task(max_retry: Option<u32>) -> Task {
        let mut sub = TaskSubmission::new(TaskType::Payment, json!({}));
        sub.max_retry = max_retry;
        Task::new(TaskId::new(1), sub, 5, t0())
    }

    #[test]
    fn new_task_is_pending_with_derived_priority() {
        let t = task(None);
        assert_eq!(t.status(), TaskStatus::Pending);
        assert_eq!(t.priority(), 4);
        assert_eq!(t.retry_count(), 0);
        assert_eq!(t.max_retry(), 5);
        assert_eq!(t.message(), "");
        assert_eq!(t.created_at(), t0());
    }

    #[test]
    fn explicit_max_retry_wins_over_default() {
        assert_eq!(task(Some(2)).max_retry(), 2);
    }

    #[test]
    fn duplicate_dependencies_are_collapsed() {
        let sub = TaskSubmission::new(TaskType::Checkout, json!({})).depends_on([
            TaskId::new(3),
            TaskId::new(1),
            TaskId::new(3),
        ]);
        let t = Task::new(TaskId::new(9), sub, 5, t0());
        assert_eq!(t.dependencies(), &[TaskId::new(3), TaskId::new(1)]);
    }

    #[test]
    fn failure_with_retries_left_goes_back_to_pending() {
        let mut t = task(Some(3));
        t.start(t0());
        let decision = t.record_failure("boom", t0());

        assert_eq!(decision, Some(Decision::Retry { retries_left: 2 }));
        assert_eq!(t.status(), TaskStatus::Pending);
        assert_eq!(t.retry_count(), 1);
        assert_eq!(t.message(), "boom");
    }

    #[test]
    fn last_failure_marks_failed_with_message() {
        let mut t = task(Some(1));
        t.start(t0());
        assert_eq!(t.record_failure("final", t0()), Some(Decision::MarkFailed));
        assert_eq!(t.status(), TaskStatus::Failed);
        assert_eq!(t.message(), "final");
    }

    #[test]
    fn terminal_task_absorbs_transitions() {
        let mut t = task(Some(5));
        t.start(t0());
        t.complete(t0());
        assert_eq!(t.status(), TaskStatus::Completed);

        let later = t0() + chrono::Duration::seconds(10);
        assert_eq!(t.record_failure("late", later), None);
        t.exhaust(later);
        t.block_on(TaskId::new(2), later);
        t.start(later);

        assert_eq!(t.status(), TaskStatus::Completed);
        assert_eq!(t.retry_count(), 0);
        assert_eq!(t.message(), "");
        assert_eq!(t.updated_at(), t0());
    }

    #[test]
    fn block_keeps_pending_and_notes_dependency() {
        let mut t = task(None);
        t.block_on(TaskId::new(7), t0());
        assert_eq!(t.status(), TaskStatus::Pending);
        assert_eq!(t.retry_count(), 0);
        assert_eq!(t.message(), "waiting on dependency task-7");
    }

    #[test]
    fn exhaust_sets_limit_message() {
        let mut t = task(Some(0));
        assert!(t.retries_exhausted());
        t.exhaust(t0());
        assert_eq!(t.status(), TaskStatus::Failed);
        assert_eq!(t.message(), MAX_RETRY_REACHED);
    }
}
