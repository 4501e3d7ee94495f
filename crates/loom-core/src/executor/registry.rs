//! ExecutorRegistry - TaskType ごとの Executor を登録・管理
//!
//! - HashMap<TaskType, Arc<dyn Executor>> で管理
//! - 二重登録は `LoomError::DuplicateExecutor`
//! - 未登録の lookup は `LoomError::UnsupportedTaskType`

use std::collections::HashMap;
use std::sync::Arc;

use super::Executor;
use crate::domain::{LoomError, TaskType};

#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<TaskType, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        task_type: TaskType,
        executor: Arc<dyn Executor>,
    ) -> Result<(), LoomError> {
        if self.executors.contains_key(&task_type) {
            return Err(LoomError::DuplicateExecutor(task_type));
        }
        self.executors.insert(task_type, executor);
        Ok(())
    }

    pub fn get(&self, task_type: TaskType) -> Result<Arc<dyn Executor>, LoomError> {
        self.executors
            .get(&task_type)
            .cloned()
            .ok_or(LoomError::UnsupportedTaskType(task_type))
    }

    pub fn contains(&self, task_type: TaskType) -> bool {
        self.executors.contains_key(&task_type)
    }

    /// Registered types in priority order.
    pub fn registered_types(&self) -> Vec<TaskType> {
        let mut types: Vec<TaskType> = self.executors.keys().copied().collect();
        types.sort_by_key(|t| t.priority());
        types
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutor;

    #[test]
    fn register_and_get() {
        let mut registry = ExecutorRegistry::new();
        registry
            .register(TaskType::Payment, Arc::new(ScriptedExecutor::succeeding()))
            .unwrap();

        assert!(registry.get(TaskType::Payment).is_ok());
        assert!(registry.contains(TaskType::Payment));
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = ExecutorRegistry::new();
        registry
            .register(TaskType::Checkout, Arc::new(ScriptedExecutor::succeeding()))
            .unwrap();
        let err = registry
            .register(TaskType::Checkout, Arc::new(ScriptedExecutor::succeeding()))
            .unwrap_err();
        assert_eq!(err, LoomError::DuplicateExecutor(TaskType::Checkout));
    }

    #[test]
    fn unregistered_type_is_unsupported() {
        let registry = ExecutorRegistry::new();
        let err = registry.get(TaskType::Notification).err().unwrap();
        assert_eq!(err, LoomError::UnsupportedTaskType(TaskType::Notification));
    }

    #[test]
    fn registered_types_come_out_in_priority_order() {
        let mut registry = ExecutorRegistry::new();
        for t in [TaskType::Payment, TaskType::Notification, TaskType::Checkout] {
            registry
                .register(t, Arc::new(ScriptedExecutor::succeeding()))
                .unwrap();
        }
        assert_eq!(
            registry.registered_types(),
            vec![TaskType::Notification, TaskType::Checkout, TaskType::Payment]
        );
    }
}
