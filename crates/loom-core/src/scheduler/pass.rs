//! Scheduler pass: one sweep over every pending task.
//!
//! Order:
//! 1. snapshot pending tasks and all statuses
//! 2. priority buckets, ascending
//! 3. inside a bucket, FIFO over the dependency graph (ready nodes seeded by id)
//!
//! A task is processed at most once per pass. Whatever is not reached is
//! only held (`TaskProcessor::hold`): exhausted tasks still fail and blocked
//! ones still get their message, but nothing is dispatched until a later pass.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span};

use super::processor::{ProcessOutcome, TaskProcessor};
use crate::domain::{Task, TaskId};
use crate::queue::{DependencyGraph, SharedStore};

/// Tally of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub completed: usize,
    pub retrying: usize,
    pub failed: usize,
    pub blocked: usize,
    pub deferred: usize,
    pub skipped: usize,
}

impl PassReport {
    fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Completed => self.completed += 1,
            ProcessOutcome::Retrying { .. } => self.retrying += 1,
            ProcessOutcome::Failed { .. } | ProcessOutcome::Exhausted => self.failed += 1,
            ProcessOutcome::Blocked(_) => self.blocked += 1,
            ProcessOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Tasks an executor ran (or tried to run) this pass.
    pub fn attempted(&self) -> usize {
        self.completed + self.retrying + self.failed
    }
}

pub struct Scheduler {
    store: SharedStore,
    processor: TaskProcessor,
    // held for the whole pass
    pass_guard: Mutex<()>,
}

impl Scheduler {
    pub fn new(store: SharedStore, processor: TaskProcessor) -> Self {
        Self {
            store,
            processor,
            pass_guard: Mutex::new(()),
        }
    }

    /// Run one pass. Returns `None` without touching any task if another pass
    /// is still running.
    pub async fn run_pass(&self) -> Option<PassReport> {
        let Ok(_guard) = self.pass_guard.try_lock() else {
            debug!("pass already running, skipping");
            return None;
        };
        Some(self.sweep().instrument(info_span!("scheduler_pass")).await)
    }

    async fn sweep(&self) -> PassReport {
        let (pending, statuses) = {
            let store = self.store.lock().await;
            (store.pending(), store.statuses())
        };

        let mut buckets: BTreeMap<u32, Vec<Task>> = BTreeMap::new();
        for task in pending {
            buckets.entry(task.priority()).or_default().push(task);
        }

        let mut report = PassReport::default();
        for (priority, batch) in buckets {
            let mut graph = DependencyGraph::for_batch(&batch, &statuses);

            let mut ready: VecDeque<TaskId> = graph.ready().into();
            let mut visited: HashSet<TaskId> = HashSet::with_capacity(batch.len());
            while let Some(id) = ready.pop_front() {
                if !visited.insert(id) {
                    continue;
                }
                let outcome = self.processor.process(id).await;
                debug!(task_id = %id, ?outcome, "processed");
                report.record(&outcome);
                ready.extend(graph.resolve(id));
            }

            for id in batch.iter().map(Task::id).filter(|id| !visited.contains(id)) {
                match self.processor.hold(id).await {
                    ProcessOutcome::Exhausted => report.failed += 1,
                    outcome => {
                        debug!(task_id = %id, ?outcome, "held");
                        report.deferred += 1;
                    }
                }
            }

            debug!(
                priority,
                size = batch.len(),
                visited = visited.len(),
                deferred = graph.deferred_count(),
                "bucket drained"
            );
        }

        info!(
            completed = report.completed,
            retrying = report.retrying,
            failed = report.failed,
            blocked = report.blocked,
            deferred = report.deferred,
            skipped = report.skipped,
            "pass finished"
        );
        report
    }
}
