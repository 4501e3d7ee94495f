//! Status - ステータスクエリの返り値

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Task, TaskId, TaskStatus, TaskType};

/// Read-only view of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusView {
    pub id: TaskId,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub message: String,
    pub retry_count: u32,
    pub max_retry: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskStatusView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            task_type: task.task_type(),
            status: task.status(),
            message: task.message().to_string(),
            retry_count: task.retry_count(),
            max_retry: task.max_retry(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}
