//! In-memory repository for assignment rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::assignment::{
    domain::{AssignmentRule, AssignmentRuleId},
    ports::{
        AssignmentRuleRepository, AssignmentRuleRepositoryError, AssignmentRuleRepositoryResult,
        RotationPick,
    },
};

/// Thread-safe in-memory assignment rule repository.
///
/// Rotation happens under the write lock, so concurrent dispatches never lose
/// a cursor update.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentRuleRepository {
    state: Arc<RwLock<InMemoryRuleState>>,
}

#[derive(Debug, Default)]
struct InMemoryRuleState {
    rules: HashMap<AssignmentRuleId, AssignmentRule>,
    insertion_order: Vec<AssignmentRuleId>,
}

impl InMemoryRuleState {
    fn ordered(&self, include_inactive: bool) -> Vec<AssignmentRule> {
        let mut rules: Vec<AssignmentRule> = self
            .insertion_order
            .iter()
            .filter_map(|id| self.rules.get(id))
            .filter(|rule| include_inactive || rule.is_active())
            .cloned()
            .collect();
        rules.sort_by_key(AssignmentRule::created_at);
        rules
    }
}

impl InMemoryAssignmentRuleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: PoisonError<T>) -> AssignmentRuleRepositoryError {
    AssignmentRuleRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AssignmentRuleRepository for InMemoryAssignmentRuleRepository {
    async fn store(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.rules.contains_key(&rule.id()) {
            return Err(AssignmentRuleRepositoryError::DuplicateRule(rule.id()));
        }
        state.insertion_order.push(rule.id());
        state.rules.insert(rule.id(), rule.clone());
        Ok(())
    }

    async fn update(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let existing = state
            .rules
            .get_mut(&rule.id())
            .ok_or(AssignmentRuleRepositoryError::NotFound(rule.id()))?;
        *existing = rule.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: AssignmentRuleId,
    ) -> AssignmentRuleRepositoryResult<Option<AssignmentRule>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.rules.get(&id).cloned())
    }

    async fn list_all(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.ordered(true))
    }

    async fn list_active(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.ordered(false))
    }

    async fn advance_rotation(
        &self,
        id: AssignmentRuleId,
        at: DateTime<Utc>,
    ) -> AssignmentRuleRepositoryResult<Option<RotationPick>> {
        let mut state = self.state.write().map_err(lock_error)?;
        let rule = state
            .rules
            .get_mut(&id)
            .ok_or(AssignmentRuleRepositoryError::NotFound(id))?;
        Ok(rule
            .advance_rotation(at)
            .map(|(index, user_id)| RotationPick { index, user_id }))
    }
}
