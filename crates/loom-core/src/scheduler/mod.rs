//! Scheduler: per-task processing, the pass driver, and the periodic ticker.

mod pass;
mod processor;
mod ticker;

pub use pass::{PassReport, Scheduler};
pub use processor::{ProcessOutcome, TaskProcessor};
pub use ticker::{Ticker, TickerStats};
