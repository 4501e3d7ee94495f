//! Task submissions: what a caller asks the engine to create.
//!
//! Typed callers build `TaskSubmission` directly. A transport layer that
//! receives JSON goes through `TaskSubmission::from_json`, which maps shape
//! errors onto the validation variants of `LoomError`.

use serde::{Deserialize, Serialize};

use super::errors::{LoomError, Result};
use super::ids::TaskId;
use super::task_type::TaskType;

/// A request to create one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub task_type: TaskType,

    #[serde(default, rename = "dependentTaskIds")]
    pub dependencies: Vec<TaskId>,

    #[serde(default, rename = "taskPayload")]
    pub payload: serde_json::Value,

    /// Falls back to the engine's configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retry: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl TaskSubmission {
    pub fn new(task_type: TaskType, payload: serde_json::Value) -> Self {
        Self {
            task_type,
            dependencies: Vec::new(),
            payload,
            max_retry: None,
            callback: None,
        }
    }

    pub fn depends_on(mut self, ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies.extend(ids);
        self
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Parse a JSON submission body.
    ///
    /// `taskType` is checked first so an unknown type is reported as
    /// `InvalidTaskType` rather than a generic decode error.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(ref body) = value else {
            return Err(LoomError::MalformedRequest(
                "submission must be a JSON object".to_string(),
            ));
        };

        match body.get("taskType") {
            Some(serde_json::Value::String(raw)) => {
                raw.parse::<TaskType>()?;
            }
            Some(other) => return Err(LoomError::InvalidTaskType(other.to_string())),
            None => {
                return Err(LoomError::MalformedRequest(
                    "missing field `taskType`".to_string(),
                ));
            }
        }

        if let Some(deps) = body.get("dependentTaskIds")
            && !deps.is_null()
            && !deps
                .as_array()
                .is_some_and(|ids| ids.iter().all(|id| id.as_u64().is_some()))
        {
            return Err(LoomError::MalformedRequest(
                "dependentTaskIds must be an array of task ids".to_string(),
            ));
        }

        // null dependentTaskIds は「依存なし」と同じ扱い
        let mut value = value;
        if let Some(body) = value.as_object_mut()
            && body.get("dependentTaskIds").is_some_and(|d| d.is_null())
        {
            body.remove("dependentTaskIds");
        }

        serde_json::from_value(value).map_err(|e| LoomError::MalformedRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn parses_full_submission() {
        let body = json!({
            "taskType": "checkout",
            "dependentTaskIds": [1, 2],
            "taskPayload": { "timeout": 1, "text": "Task B" },
            "maxRetry": 3,
            "callback": "http://localhost:9000/hook"
        });

        let sub = TaskSubmission::from_json(body).unwrap();
        assert_eq!(sub.task_type, TaskType::Checkout);
        assert_eq!(sub.dependencies, vec![TaskId::new(1), TaskId::new(2)]);
        assert_eq!(sub.payload["text"], "Task B");
        assert_eq!(sub.max_retry, Some(3));
        assert_eq!(sub.callback.as_deref(), Some("http://localhost:9000/hook"));
    }

    #[rstest]
    #[case::absent(json!({ "taskType": "payment", "taskPayload": {} }))]
    #[case::null(json!({ "taskType": "payment", "dependentTaskIds": null, "taskPayload": {} }))]
    #[case::empty(json!({ "taskType": "payment", "dependentTaskIds": [], "taskPayload": {} }))]
    fn missing_dependencies_mean_none(#[case] body: serde_json::Value) {
        let sub = TaskSubmission::from_json(body).unwrap();
        assert!(sub.dependencies.is_empty());
        assert_eq!(sub.max_retry, None);
    }

    #[test]
    fn unknown_type_is_invalid_task_type() {
        let err = TaskSubmission::from_json(json!({ "taskType": "unknown" })).unwrap_err();
        assert_eq!(err, LoomError::InvalidTaskType("unknown".to_string()));
    }

    #[rstest]
    #[case::scalar(json!(5))]
    #[case::object(json!({ "id": 1 }))]
    #[case::strings(json!(["1", "2"]))]
    #[case::negative(json!([-1]))]
    fn non_array_dependencies_are_rejected(#[case] deps: serde_json::Value) {
        let body = json!({ "taskType": "notification", "dependentTaskIds": deps });
        let err = TaskSubmission::from_json(body).unwrap_err();
        assert!(matches!(err, LoomError::MalformedRequest(_)));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = TaskSubmission::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, LoomError::MalformedRequest(_)));
    }
}
