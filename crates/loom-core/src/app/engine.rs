//! Engine - 外部に公開する API の表面
//!
//! submit / query_status / counts / run_pass / start_ticker。
//! id の払い出しと store は Engine ごとに持つ（プロセス全体の共有状態はない）。

use std::sync::Arc;

use tracing::info;

use super::status::TaskStatusView;
use crate::config::EngineConfig;
use crate::domain::{IdAllocator, LoomError, Task, TaskId, TaskSubmission};
use crate::executor::ExecutorRegistry;
use crate::observability::QueueCounts;
use crate::ports::Clock;
use crate::queue::SharedStore;
use crate::scheduler::{PassReport, Scheduler, Ticker};

pub struct Engine {
    config: EngineConfig,
    ids: IdAllocator,
    store: SharedStore,
    registry: Arc<ExecutorRegistry>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<Scheduler>,
}

impl Engine {
    pub(crate) fn from_parts(
        config: EngineConfig,
        ids: IdAllocator,
        store: SharedStore,
        registry: Arc<ExecutorRegistry>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            config,
            ids,
            store,
            registry,
            clock,
            scheduler,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a new pending task.
    ///
    /// Fails without creating anything if a dependency does not exist or the
    /// registered executor rejects the payload.
    pub async fn submit(&self, submission: TaskSubmission) -> Result<TaskId, LoomError> {
        if let Ok(executor) = self.registry.get(submission.task_type) {
            executor.validate(&submission.payload)?;
        }

        let mut store = self.store.lock().await;
        if let Some(missing) = submission
            .dependencies
            .iter()
            .copied()
            .find(|dep| !store.contains(*dep))
        {
            return Err(LoomError::InvalidDependency(missing));
        }

        let id = self.ids.next();
        let task_type = submission.task_type;
        store.insert(Task::new(
            id,
            submission,
            self.config.default_max_retry,
            self.clock.now(),
        ));
        info!(task_id = %id, %task_type, "task submitted");
        Ok(id)
    }

    /// Submit a JSON request body (`taskType`, `dependentTaskIds`, ...).
    pub async fn submit_json(&self, body: serde_json::Value) -> Result<TaskId, LoomError> {
        let submission = TaskSubmission::from_json(body)?;
        self.submit(submission).await
    }

    pub async fn query_status(&self, id: TaskId) -> Result<TaskStatusView, LoomError> {
        let store = self.store.lock().await;
        store.get(id).map(TaskStatusView::from)
    }

    /// Every task, ascending by id.
    pub async fn list(&self) -> Vec<TaskStatusView> {
        let store = self.store.lock().await;
        store.all().map(TaskStatusView::from).collect()
    }

    pub async fn counts(&self) -> QueueCounts {
        self.store.lock().await.counts()
    }

    /// Run one scheduler pass now. `None` if a pass is already running.
    pub async fn run_pass(&self) -> Option<PassReport> {
        self.scheduler.run_pass().await
    }

    /// Start periodic passes at `tick_interval_ms`.
    pub fn start_ticker(&self) -> Ticker {
        Ticker::spawn(Arc::clone(&self.scheduler), self.config.tick_interval())
    }
}
