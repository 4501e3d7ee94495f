use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use loom_core::executor::HttpExecutor;
use loom_core::impls::ReqwestTransport;
use loom_core::{Engine, EngineBuilder, TaskId, TaskType};
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

mod logging;
mod settings;

use logging::{LogFormat, init_logging};
use settings::Overrides;

const DEMO_TASKS: &str = include_str!("../demo/tasks.json");

/// Submit a batch of tasks, drive them with the ticker until they settle,
/// and print the final status of every task as JSON.
#[derive(Debug, Parser)]
#[command(name = "loom", version, about)]
struct Cli {
    /// TOML config file (default: ./loom.toml or ./config/loom.toml if present)
    #[arg(short, long, env = "LOOM_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of submissions. `dependentTaskIds` holds 1-based positions
    /// of earlier entries in this array, mapped to the ids those entries
    /// were given. An entry depending on a rejected one is skipped too.
    /// Runs a built-in demo if absent.
    #[arg(short, long)]
    tasks: Option<PathBuf>,

    #[arg(long)]
    tick_ms: Option<u64>,

    #[arg(long)]
    max_retry: Option<u32>,

    #[arg(long)]
    executor_timeout_ms: Option<u64>,

    /// Stop waiting after this many seconds.
    #[arg(long, default_value_t = 120)]
    wait_secs: u64,

    #[arg(
        short,
        long,
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    let config = settings::load(
        cli.config.as_deref(),
        &Overrides {
            default_max_retry: cli.max_retry,
            tick_interval_ms: cli.tick_ms,
            executor_timeout_ms: cli.executor_timeout_ms,
        },
    )?;
    info!(?config, "configuration loaded");

    let executor = Arc::new(HttpExecutor::new(Arc::new(ReqwestTransport::new())));
    let engine = EngineBuilder::new(config)
        .register_all(executor)?
        .expect_types(&TaskType::ALL)
        .build()
        .context("failed to build engine")?;

    let batch = read_batch(cli.tasks.as_deref())?;
    submit_batch(&engine, batch).await;

    let ticker = engine.start_ticker();
    let settled = wait_until_settled(&engine, Duration::from_secs(cli.wait_secs)).await;
    ticker.shutdown().await;

    let report = serde_json::to_string_pretty(&engine.list().await)
        .context("failed to serialize task statuses")?;
    println!("{report}");

    if !settled {
        warn!("stopped before every task reached a terminal state");
    }
    Ok(())
}

fn read_batch(path: Option<&std::path::Path>) -> Result<Vec<serde_json::Value>> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => DEMO_TASKS.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&raw).context("tasks file is not JSON")?;
    let serde_json::Value::Array(items) = value else {
        bail!("tasks file must contain a JSON array");
    };
    Ok(items)
}

/// Rejected submissions are logged and skipped.
async fn submit_batch(engine: &Engine, batch: Vec<serde_json::Value>) {
    let mut assigned: Vec<Option<TaskId>> = Vec::with_capacity(batch.len());
    for (index, mut body) in batch.into_iter().enumerate() {
        if let Err(e) = remap_dependencies(&mut body, &assigned) {
            warn!(index, error = %e, "submission skipped");
            assigned.push(None);
            continue;
        }
        match engine.submit_json(body).await {
            Ok(id) => {
                info!(index, task_id = %id, "submitted");
                assigned.push(Some(id));
            }
            Err(e) => {
                warn!(index, error = %e, "submission rejected");
                assigned.push(None);
            }
        }
    }
}

/// Rewrite batch positions in `dependentTaskIds` to assigned task ids.
/// Anything that is not an array is left for the engine to reject.
fn remap_dependencies(body: &mut serde_json::Value, assigned: &[Option<TaskId>]) -> Result<()> {
    let Some(serde_json::Value::Array(deps)) = body.get_mut("dependentTaskIds") else {
        return Ok(());
    };
    for dep in deps.iter_mut() {
        let Some(position) = dep.as_u64().filter(|p| *p >= 1) else {
            bail!("dependency {dep} is not a batch position");
        };
        let slot = usize::try_from(position - 1).ok().and_then(|i| assigned.get(i));
        match slot {
            Some(Some(id)) => *dep = serde_json::Value::from(id.as_u64()),
            Some(None) => bail!("dependency at position {position} was not submitted"),
            None => bail!("dependency at position {position} is not an earlier entry"),
        }
    }
    Ok(())
}

/// Poll until nothing is pending or in progress. Returns `false` on timeout
/// or Ctrl-C.
async fn wait_until_settled(engine: &Engine, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    loop {
        if engine.counts().await.is_settled() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return false;
            }
            _ = sleep(Duration::from_millis(250)) => {}
        }
    }
}
