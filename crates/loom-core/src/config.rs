//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RETRY: u32 = 5;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `max_retry` for submissions that do not set one.
    pub default_max_retry: u32,
    pub tick_interval_ms: u64,
    /// Upper bound on one `perform` call. `None` waits forever.
    pub executor_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_retry: DEFAULT_MAX_RETRY,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            executor_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        // interval() panics on a zero period
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn executor_timeout(&self) -> Option<Duration> {
        self.executor_timeout_ms.map(Duration::from_millis)
    }
}
