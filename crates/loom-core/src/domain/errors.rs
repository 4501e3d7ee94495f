//! Errors - エラー型と分類
//!
//! - validation 系（InvalidTaskType / InvalidDependency / InvalidPayload / MalformedRequest）:
//!   サブミットした呼び出し元に同期的に返す。タスクは作られない。
//! - NotFound: ステータス照会で返す。
//! - 実行時エラー（UnsupportedTaskType / Execution / Transport / Timeout）:
//!   パスの外には出さず、タスクの status / message に吸収する。

use thiserror::Error;

use super::ids::TaskId;
use super::task_type::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoomError {
    #[error("invalid task type: {0}")]
    InvalidTaskType(String),

    #[error("invalid dependency: {0} does not exist")]
    InvalidDependency(TaskId),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("unsupported task type: {0}")]
    UnsupportedTaskType(TaskType),

    #[error("duplicate executor for task_type={0}")]
    DuplicateExecutor(TaskType),

    #[error("{0}")]
    Execution(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("executor timed out after {0}ms")]
    Timeout(u64),
}

impl LoomError {
    /// Errors caused by the submitted request itself (map to a 4xx upstream).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoomError::InvalidTaskType(_)
                | LoomError::InvalidDependency(_)
                | LoomError::InvalidPayload(_)
                | LoomError::MalformedRequest(_)
        )
    }
}

pub type Result<T, E = LoomError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::task_type(LoomError::InvalidTaskType("x".into()), true)]
    #[case::dependency(LoomError::InvalidDependency(TaskId::new(9)), true)]
    #[case::payload(LoomError::InvalidPayload("x".into()), true)]
    #[case::malformed(LoomError::MalformedRequest("x".into()), true)]
    #[case::not_found(LoomError::NotFound(TaskId::new(9)), false)]
    #[case::unsupported(LoomError::UnsupportedTaskType(TaskType::Payment), false)]
    #[case::timeout(LoomError::Timeout(10), false)]
    fn validation_classification(#[case] err: LoomError, #[case] expected: bool) {
        assert_eq!(err.is_validation(), expected);
    }

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            LoomError::InvalidDependency(TaskId::new(7)).to_string(),
            "invalid dependency: task-7 does not exist"
        );
        assert_eq!(
            LoomError::UnsupportedTaskType(TaskType::Checkout).to_string(),
            "unsupported task type: checkout"
        );
    }
}
