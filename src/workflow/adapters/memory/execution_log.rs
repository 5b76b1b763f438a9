//! In-memory execution log.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::workflow::{
    domain::{WorkflowExecution, WorkflowRuleId},
    ports::{ExecutionLogError, ExecutionLogResult, WorkflowExecutionLog},
};

/// Thread-safe in-memory execution log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExecutionLog {
    entries: Arc<RwLock<Vec<WorkflowExecution>>>,
}

impl InMemoryExecutionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded execution in append order.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionLogError::Persistence`] when the lock is poisoned.
    pub fn all(&self) -> ExecutionLogResult<Vec<WorkflowExecution>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.clone())
    }
}

fn lock_error<T>(err: PoisonError<T>) -> ExecutionLogError {
    ExecutionLogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl WorkflowExecutionLog for InMemoryExecutionLog {
    async fn record(&self, execution: &WorkflowExecution) -> ExecutionLogResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        entries.push(execution.clone());
        Ok(())
    }

    async fn list_for_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> ExecutionLogResult<Vec<WorkflowExecution>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries
            .iter()
            .filter(|execution| execution.rule_id() == rule_id)
            .cloned()
            .collect())
    }
}
