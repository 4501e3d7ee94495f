//! EngineBuilder - Engine の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - expect_types() で期待される TaskType を登録
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
//! - 不足があれば BuildError を返す

use std::sync::Arc;

use super::engine::Engine;
use crate::config::EngineConfig;
use crate::domain::{IdAllocator, LoomError, TaskType};
use crate::executor::{Executor, ExecutorRegistry};
use crate::ports::{Clock, SystemClock};
use crate::queue::TaskStore;
use crate::scheduler::{Scheduler, TaskProcessor};

/// EngineBuilder は Engine を構築
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(EngineConfig::default())
///     .register(TaskType::Payment, Arc::new(PaymentExecutor))?
///     .expect_types(&[TaskType::Payment])
///     .build()?;
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    registry: ExecutorRegistry,
    expected_types: Option<Vec<TaskType>>,
}

/// BuildError は Engine 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing executors for task types: {0:?}")]
    MissingExecutors(Vec<TaskType>),
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            registry: ExecutorRegistry::new(),
            expected_types: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Executor を登録（同じ TaskType の二重登録はエラー）
    pub fn register(
        mut self,
        task_type: TaskType,
        executor: Arc<dyn Executor>,
    ) -> Result<Self, LoomError> {
        self.registry.register(task_type, executor)?;
        Ok(self)
    }

    /// 同じ Executor を全 TaskType に登録
    pub fn register_all(mut self, executor: Arc<dyn Executor>) -> Result<Self, LoomError> {
        for task_type in TaskType::ALL {
            self.registry.register(task_type, Arc::clone(&executor))?;
        }
        Ok(self)
    }

    pub fn expect_types(mut self, task_types: &[TaskType]) -> Self {
        self.expected_types = Some(task_types.to_vec());
        self
    }

    pub fn build(self) -> Result<Engine, BuildError> {
        if let Some(expected) = &self.expected_types {
            let missing: Vec<TaskType> = expected
                .iter()
                .copied()
                .filter(|t| !self.registry.contains(*t))
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingExecutors(missing));
            }
        }

        let store = TaskStore::new().shared();
        let registry = Arc::new(self.registry);
        let processor = TaskProcessor::new(
            store.clone(),
            Arc::clone(&registry),
            Arc::clone(&self.clock),
            self.config.executor_timeout(),
        );
        let scheduler = Arc::new(Scheduler::new(store.clone(), processor));

        Ok(Engine::from_parts(
            self.config,
            IdAllocator::new(),
            store,
            registry,
            self.clock,
            scheduler,
        ))
    }
}
