//! TaskProcessor - 1 タスクの 1 回分の試行
//!
//! store の lock は判定と状態更新の間だけ持ち、executor の await 中は手放す。
//! `perform` は別 task で走らせるので、executor の panic も
//! 「失敗した 1 回の試行」として記録される。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, debug_span, info, warn};

use crate::domain::{Decision, ExecutionOutcome, LoomError, TaskId, TaskStatus};
use crate::executor::{ExecutorRegistry, NotifyContext};
use crate::ports::Clock;
use crate::queue::{SharedStore, TaskStore};

/// What one `process` (or `hold`) call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Missing, terminal, or not pending. Nothing changed.
    /// From `hold`, also: ready but held back.
    Skipped,
    /// Retries were already used up; marked failed without running.
    Exhausted,
    /// Still pending behind this dependency. No retry consumed.
    Blocked(TaskId),
    Completed,
    /// Attempt failed, task is pending again.
    Retrying { retry_count: u32 },
    /// Attempt failed and that was the last one.
    Failed { message: String },
}

pub struct TaskProcessor {
    store: SharedStore,
    registry: Arc<ExecutorRegistry>,
    clock: Arc<dyn Clock>,
    executor_timeout: Option<Duration>,
}

impl TaskProcessor {
    pub fn new(
        store: SharedStore,
        registry: Arc<ExecutorRegistry>,
        clock: Arc<dyn Clock>,
        executor_timeout: Option<Duration>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            executor_timeout,
        }
    }

    pub async fn process(&self, id: TaskId) -> ProcessOutcome {
        self.process_inner(id)
            .instrument(debug_span!("process_task", task_id = %id))
            .await
    }

    /// Apply every check that does not need an executor, without
    /// dispatching: exhausted tasks are failed, blocked ones get the blocking
    /// dependency noted. Used for tasks a pass holds back.
    pub async fn hold(&self, id: TaskId) -> ProcessOutcome {
        async {
            let mut store = self.store.lock().await;
            let now = self.clock.now();
            Self::gate(&mut store, id, now).unwrap_or(ProcessOutcome::Skipped)
        }
        .instrument(debug_span!("hold_task", task_id = %id))
        .await
    }

    /// `Some(outcome)` when the task must not be dispatched.
    fn gate(store: &mut TaskStore, id: TaskId, now: DateTime<Utc>) -> Option<ProcessOutcome> {
        let Ok(task) = store.get(id) else {
            debug!("task not found, skipping");
            return Some(ProcessOutcome::Skipped);
        };
        if task.is_terminal() {
            debug!(status = %task.status(), "terminal, skipping");
            return Some(ProcessOutcome::Skipped);
        }
        let exhausted = task.retries_exhausted();
        let status = task.status();
        let blocking = task.dependencies().iter().copied().find(|dep| {
            store
                .get(*dep)
                .is_ok_and(|d| d.status() != TaskStatus::Completed)
        });

        let Some(task) = store.get_mut(id) else {
            return Some(ProcessOutcome::Skipped);
        };
        if exhausted {
            task.exhaust(now);
            info!(retry_count = task.retry_count(), "task failed: max retry limit reached");
            return Some(ProcessOutcome::Exhausted);
        }
        if status != TaskStatus::Pending {
            debug!(%status, "not pending, skipping");
            return Some(ProcessOutcome::Skipped);
        }
        if let Some(dep) = blocking {
            task.block_on(dep, now);
            debug!(dependency = %dep, "blocked on dependency");
            return Some(ProcessOutcome::Blocked(dep));
        }
        None
    }

    async fn process_inner(&self, id: TaskId) -> ProcessOutcome {
        // 判定フェーズ（lock 保持）
        let (executor, payload, callback) = {
            let mut store = self.store.lock().await;
            let now = self.clock.now();

            if let Some(outcome) = Self::gate(&mut store, id, now) {
                return outcome;
            }
            let Some(task) = store.get_mut(id) else {
                return ProcessOutcome::Skipped;
            };
            let task_type = task.task_type();

            let executor = match self.registry.get(task_type) {
                Ok(executor) => executor,
                Err(e) => {
                    let decision = task.record_failure(e.to_string(), now);
                    return Self::failure_outcome(decision, task.retry_count(), task.message());
                }
            };

            task.start(now);
            debug!(%task_type, "dispatching");
            (executor, task.payload().clone(), task.callback().map(str::to_string))
        };

        // 実行フェーズ（lock なし）
        let handle = tokio::spawn({
            let executor = Arc::clone(&executor);
            let payload = payload.clone();
            async move { executor.perform(&payload).await }
        });
        let result = self.await_attempt(handle).await;

        // 結果反映フェーズ（lock 保持）
        let (outcome, data) = {
            let mut store = self.store.lock().await;
            let now = self.clock.now();
            let Some(task) = store.get_mut(id) else {
                return ProcessOutcome::Skipped;
            };

            match result {
                Ok(ExecutionOutcome {
                    success: true,
                    data,
                    ..
                }) => {
                    task.complete(now);
                    info!("task completed");
                    (ProcessOutcome::Completed, data)
                }
                Ok(outcome) => {
                    let decision = task.record_failure(outcome.failure_message(), now);
                    let failed = Self::failure_outcome(decision, task.retry_count(), task.message());
                    (failed, None)
                }
                Err(e) => {
                    let decision = task.record_failure(e.to_string(), now);
                    let failed = Self::failure_outcome(decision, task.retry_count(), task.message());
                    (failed, None)
                }
            }
        };

        if outcome == ProcessOutcome::Completed {
            let ctx = NotifyContext {
                task_id: id,
                callback,
                data,
                error_message: None,
            };
            if let Err(e) = executor.notify(ctx).await {
                warn!(error = %e, "notify failed");
            }
        }
        outcome
    }

    async fn await_attempt(
        &self,
        mut handle: tokio::task::JoinHandle<Result<ExecutionOutcome, LoomError>>,
    ) -> Result<ExecutionOutcome, LoomError> {
        let joined = match self.executor_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    return Err(LoomError::Timeout(ms));
                }
            },
            None => handle.await,
        };
        joined.unwrap_or_else(|e| {
            if e.is_panic() {
                Err(LoomError::Execution("executor panicked".to_string()))
            } else {
                Err(LoomError::Execution("executor cancelled".to_string()))
            }
        })
    }

    fn failure_outcome(decision: Option<Decision>, retry_count: u32, message: &str) -> ProcessOutcome {
        match decision {
            Some(Decision::Retry { retries_left }) => {
                warn!(retry_count, retries_left, message, "attempt failed, will retry");
                ProcessOutcome::Retrying { retry_count }
            }
            Some(Decision::MarkFailed) => {
                info!(retry_count, message, "task failed");
                ProcessOutcome::Failed {
                    message: message.to_string(),
                }
            }
            None => ProcessOutcome::Skipped,
        }
    }
}
