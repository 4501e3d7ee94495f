//! Task status state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Task status.
///
/// State transitions:
/// - Pending -> InProgress -> Completed
/// - Pending -> InProgress -> Pending (retryable failure, retries left)
/// - Pending -> InProgress -> Failed (retries exhausted)
/// - Pending -> Failed (retries already exhausted, or setup failure on the last retry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a pass (new, retrying, or blocked on a dependency).
    Pending,

    /// Dispatched to an executor in the current pass.
    InProgress,

    /// Executor reported success.
    Completed,

    /// Gave up (max retries reached).
    Failed,
}

impl TaskStatus {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
