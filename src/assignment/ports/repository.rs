//! Repository port for assignment rule persistence and rotation.

use crate::assignment::domain::{AssignmentRule, AssignmentRuleId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment rule repository operations.
pub type AssignmentRuleRepositoryResult<T> = Result<T, AssignmentRuleRepositoryError>;

/// Candidate chosen by an atomic round-robin step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPick {
    /// New value of the rotation cursor.
    pub index: usize,
    /// Candidate at that index.
    pub user_id: UserId,
}

/// Assignment rule persistence contract.
#[async_trait]
pub trait AssignmentRuleRepository: Send + Sync {
    /// Stores a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRuleRepositoryError::DuplicateRule`] when the rule
    /// ID already exists.
    async fn store(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()>;

    /// Persists changes to an existing rule, including its rotation cursor.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRuleRepositoryError::NotFound`] when the rule does
    /// not exist.
    async fn update(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()>;

    /// Finds a rule by identifier.
    async fn find_by_id(
        &self,
        id: AssignmentRuleId,
    ) -> AssignmentRuleRepositoryResult<Option<AssignmentRule>>;

    /// Returns every rule in ascending creation order.
    async fn list_all(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>>;

    /// Returns active rules in ascending creation order.
    async fn list_active(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>>;

    /// Advances the rule's rotation cursor in a single atomic step and returns
    /// the candidate it now points at.
    ///
    /// Returns `None` when the rule has no candidates; the cursor is left
    /// untouched in that case.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRuleRepositoryError::NotFound`] when the rule does
    /// not exist.
    async fn advance_rotation(
        &self,
        id: AssignmentRuleId,
        at: DateTime<Utc>,
    ) -> AssignmentRuleRepositoryResult<Option<RotationPick>>;
}

/// Errors returned by assignment rule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentRuleRepositoryError {
    /// A rule with the same identifier already exists.
    #[error("duplicate assignment rule identifier: {0}")]
    DuplicateRule(AssignmentRuleId),

    /// The rule was not found.
    #[error("assignment rule not found: {0}")]
    NotFound(AssignmentRuleId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssignmentRuleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
