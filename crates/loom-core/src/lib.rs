//! loom-core
//!
//! In-process task orchestration: typed tasks with dependencies, priority
//! buckets, bounded retries, and pluggable executors driven by a periodic
//! scheduler pass.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task_type, task, submission, outcome, decision, state, errors）
//! - **ports**: 抽象化レイヤー（Clock, Transport）
//! - **queue**: TaskStore と priority bucket ごとの DependencyGraph
//! - **executor**: Executor trait, ExecutorRegistry, HttpExecutor
//! - **scheduler**: TaskProcessor, Scheduler (pass), Ticker
//! - **app**: EngineBuilder と Engine（外部 API）
//! - **impls**: ports の実装（ReqwestTransport）

pub mod app;
pub mod config;
pub mod domain;
pub mod executor;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use app::{BuildError, Engine, EngineBuilder, TaskStatusView};
pub use config::EngineConfig;
pub use domain::{LoomError, TaskId, TaskStatus, TaskSubmission, TaskType};
pub use observability::QueueCounts;
pub use scheduler::{PassReport, Ticker, TickerStats};
