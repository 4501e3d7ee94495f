//! Ticker - 一定間隔で scheduler pass を起動するループ
//!
//! - pass は 1 つずつ await する（重ならない）
//! - pass は spawn した task で走らせ、panic しても JoinError を log して続行
//! - `shutdown()` は watch channel で停止を伝え、実行中の pass の完了を待つ
//!   （戻り値は loop 全体の集計 `TickerStats`）

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::pass::Scheduler;

/// What the loop did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickerStats {
    /// Passes that ran to the end.
    pub passes: u64,
    /// Ticks that found a pass already running.
    pub skipped: u64,
    /// Passes that panicked.
    pub panicked: u64,
}

/// Handle to the background tick loop.
pub struct Ticker {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<TickerStats>,
}

impl Ticker {
    pub fn spawn(scheduler: Arc<Scheduler>, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(tick_loop(scheduler, period, shutdown_rx));
        info!(period_ms = period.as_millis() as u64, "ticker started");
        Self { shutdown_tx, join }
    }

    /// Ask the loop to stop after the current pass.
    pub fn request_shutdown(&self) {
        // receiver is gone only if the loop already exited
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown(self) -> TickerStats {
        self.request_shutdown();
        let stats = self.join.await.unwrap_or_else(|e| {
            error!(error = %e, "ticker loop ended abnormally");
            TickerStats::default()
        });
        info!(
            passes = stats.passes,
            skipped = stats.skipped,
            panicked = stats.panicked,
            "ticker stopped"
        );
        stats
    }
}

async fn tick_loop(
    scheduler: Arc<Scheduler>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> TickerStats {
    let mut stats = TickerStats::default();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        let pass = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run_pass().await }
        });
        match pass.await {
            Ok(Some(report)) => {
                stats.passes += 1;
                debug!(?report, "tick");
            }
            Ok(None) => {
                stats.skipped += 1;
                debug!("tick skipped: a pass is already running");
            }
            Err(e) => {
                stats.panicked += 1;
                error!(error = %e, "scheduler pass panicked");
            }
        }
    }
    stats
}
