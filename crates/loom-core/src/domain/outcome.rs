//! Outcome model: what an executor reports back for one attempt.

use serde::{Deserialize, Serialize};

/// Result of one `Executor::perform` call.
///
/// `success: false` is a retryable failure; `message` becomes the task's
/// message. `data` is forwarded to `Executor::notify` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Message recorded on the task when this outcome is a failure.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "executor reported failure".to_string())
    }
}
