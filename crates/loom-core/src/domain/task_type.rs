//! TaskType - 受け付けるタスク種別と優先度テーブル
//!
//! 種別は閉じた enum。未知の文字列は `InvalidTaskType` としてサブミット時に弾く。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::LoomError;

/// Kind of work a task performs.
///
/// Serialized as snake_case so it matches the names callers submit:
/// `notification`, `checkout`, `fetch_inventory`, `payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Notification,
    Checkout,
    FetchInventory,
    Payment,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Notification,
        TaskType::Checkout,
        TaskType::FetchInventory,
        TaskType::Payment,
    ];

    /// Static type -> priority table. Lower numbers are scheduled first.
    pub const fn priority(self) -> u32 {
        match self {
            TaskType::Notification => 1,
            TaskType::Checkout => 2,
            TaskType::FetchInventory => 3,
            TaskType::Payment => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskType::Notification => "notification",
            TaskType::Checkout => "checkout",
            TaskType::FetchInventory => "fetch_inventory",
            TaskType::Payment => "payment",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LoomError::InvalidTaskType(s.to_string()))
    }
}
