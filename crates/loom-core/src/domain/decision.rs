//! Decision model: what happens to a task after a failed attempt.
//!
//! Pure function of (retry_count, max_retry). The task applies the decision;
//! nothing here mutates state.

/// The next action after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Back to pending; a later pass may try again.
    Retry { retries_left: u32 },

    /// Give up (terminal).
    MarkFailed,
}

/// Decide based on the retry count *after* the failed attempt was counted.
pub fn decide(retry_count: u32, max_retry: u32) -> Decision {
    if retry_count >= max_retry {
        Decision::MarkFailed
    } else {
        Decision::Retry {
            retries_left: max_retry - retry_count,
        }
    }
}
