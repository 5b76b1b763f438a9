//! Append-only log of rule evaluations.

use crate::workflow::domain::{WorkflowExecution, WorkflowRuleId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for execution log operations.
pub type ExecutionLogResult<T> = Result<T, ExecutionLogError>;

/// Execution log contract.
#[async_trait]
pub trait WorkflowExecutionLog: Send + Sync {
    /// Appends an execution.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionLogError::Persistence`] on backend failure.
    async fn record(&self, execution: &WorkflowExecution) -> ExecutionLogResult<()>;

    /// Returns the executions of a rule, oldest first.
    async fn list_for_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> ExecutionLogResult<Vec<WorkflowExecution>>;
}

/// Errors returned by execution log implementations.
#[derive(Debug, Clone, Error)]
pub enum ExecutionLogError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutionLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
