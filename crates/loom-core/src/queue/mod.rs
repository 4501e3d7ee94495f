//! Queue module: task storage and per-bucket dependency resolution.

mod dependency;
mod store;

pub use dependency::DependencyGraph;
pub use store::{SharedStore, TaskStore};
