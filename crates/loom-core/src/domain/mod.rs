//! Domain model (ids, task types, task entity, outcomes, errors).

pub mod decision;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod submission;
pub mod state;
pub mod task;
pub mod task_type;

pub use decision::{Decision, decide};
pub use errors::{LoomError, Result};
pub use ids::{IdAllocator, TaskId};
pub use outcome::ExecutionOutcome;
pub use submission::TaskSubmission;
pub use state::TaskStatus;
pub use task::{MAX_RETRY_REACHED, Task};
pub use task_type::TaskType;
