//! Repository port for workflow rules.

use crate::workflow::domain::{Trigger, WorkflowRule, WorkflowRuleId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow rule repository operations.
pub type WorkflowRuleRepositoryResult<T> = Result<T, WorkflowRuleRepositoryError>;

/// Workflow rule persistence contract.
#[async_trait]
pub trait WorkflowRuleRepository: Send + Sync {
    /// Stores a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRuleRepositoryError::DuplicateRule`] when the rule ID
    /// already exists.
    async fn store(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()>;

    /// Persists changes to an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRuleRepositoryError::NotFound`] when the rule does
    /// not exist.
    async fn update(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()>;

    /// Deletes a rule and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRuleRepositoryError::NotFound`] when the rule does
    /// not exist.
    async fn delete(&self, id: WorkflowRuleId) -> WorkflowRuleRepositoryResult<WorkflowRule>;

    /// Finds a rule by identifier.
    async fn find_by_id(
        &self,
        id: WorkflowRuleId,
    ) -> WorkflowRuleRepositoryResult<Option<WorkflowRule>>;

    /// Returns every rule in creation order.
    async fn list_all(&self) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>>;

    /// Returns the active rules listening to `trigger` in creation order.
    async fn list_active_for(
        &self,
        trigger: Trigger,
    ) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>>;
}

/// Errors returned by workflow rule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRuleRepositoryError {
    /// A rule with the same identifier already exists.
    #[error("duplicate workflow rule identifier: {0}")]
    DuplicateRule(WorkflowRuleId),

    /// The rule was not found.
    #[error("workflow rule not found: {0}")]
    NotFound(WorkflowRuleId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRuleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
