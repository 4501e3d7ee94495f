//! Executor - タスク種別ごとの実行ロジック
//!
//! # 責務
//! - `perform`: payload を解釈して処理し、成功／失敗を返す
//! - `notify`: 成功後の通知（best-effort、失敗してもタスク状態は変わらない）
//! - `validate`: submit 時の payload 検査（既定は常に OK）
//!
//! retry や状態遷移は扱わない。それは `scheduler::TaskProcessor` の仕事。

pub mod http;
pub mod registry;

pub use self::http::{HttpExecutor, HttpPayload};
pub use self::registry::ExecutorRegistry;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ExecutionOutcome, LoomError, TaskId};

/// What `notify` gets to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyContext {
    pub task_id: TaskId,
    #[serde(skip)]
    pub callback: Option<String>,
    pub data: Option<serde_json::Value>,
    #[serde(rename = "message")]
    pub error_message: Option<String>,
}

/// Executor は 1 種類のタスクを処理する
///
/// `perform` が `Err` を返した場合も `success: false` と同じく
/// retry 対象の失敗として扱われる。
#[async_trait]
pub trait Executor: Send + Sync {
    async fn perform(&self, payload: &serde_json::Value) -> Result<ExecutionOutcome, LoomError>;

    async fn notify(&self, ctx: NotifyContext) -> Result<(), LoomError>;

    /// Reject a payload before a task is created.
    fn validate(&self, _payload: &serde_json::Value) -> Result<(), LoomError> {
        Ok(())
    }
}
