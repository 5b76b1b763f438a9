//! In-memory repository for workflow rules.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::workflow::{
    domain::{Trigger, WorkflowRule, WorkflowRuleId},
    ports::{WorkflowRuleRepository, WorkflowRuleRepositoryError, WorkflowRuleRepositoryResult},
};

/// Thread-safe in-memory workflow rule repository.
///
/// Rules are kept in insertion order, which doubles as creation order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRuleRepository {
    rules: Arc<RwLock<Vec<WorkflowRule>>>,
}

impl InMemoryWorkflowRuleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: PoisonError<T>) -> WorkflowRuleRepositoryError {
    WorkflowRuleRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl WorkflowRuleRepository for InMemoryWorkflowRuleRepository {
    async fn store(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()> {
        let mut rules = self.rules.write().map_err(lock_error)?;
        if rules.iter().any(|existing| existing.id() == rule.id()) {
            return Err(WorkflowRuleRepositoryError::DuplicateRule(rule.id()));
        }
        rules.push(rule.clone());
        Ok(())
    }

    async fn update(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()> {
        let mut rules = self.rules.write().map_err(lock_error)?;
        let existing = rules
            .iter_mut()
            .find(|existing| existing.id() == rule.id())
            .ok_or(WorkflowRuleRepositoryError::NotFound(rule.id()))?;
        *existing = rule.clone();
        Ok(())
    }

    async fn delete(&self, id: WorkflowRuleId) -> WorkflowRuleRepositoryResult<WorkflowRule> {
        let mut rules = self.rules.write().map_err(lock_error)?;
        let position = rules
            .iter()
            .position(|rule| rule.id() == id)
            .ok_or(WorkflowRuleRepositoryError::NotFound(id))?;
        Ok(rules.remove(position))
    }

    async fn find_by_id(
        &self,
        id: WorkflowRuleId,
    ) -> WorkflowRuleRepositoryResult<Option<WorkflowRule>> {
        let rules = self.rules.read().map_err(lock_error)?;
        Ok(rules.iter().find(|rule| rule.id() == id).cloned())
    }

    async fn list_all(&self) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>> {
        let rules = self.rules.read().map_err(lock_error)?;
        Ok(rules.clone())
    }

    async fn list_active_for(
        &self,
        trigger: Trigger,
    ) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>> {
        let rules = self.rules.read().map_err(lock_error)?;
        Ok(rules
            .iter()
            .filter(|rule| rule.is_active() && rule.trigger() == trigger)
            .cloned()
            .collect())
    }
}
