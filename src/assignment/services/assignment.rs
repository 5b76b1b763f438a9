//! Service layer for lead auto-assignment and rule management.

use crate::assignment::{
    domain::{
        AssignmentDomainError, AssignmentFilters, AssignmentRule, AssignmentRuleId,
        AssignmentRuleName, AssignmentStrategy, LeadAttributes, UserId,
    },
    ports::{
        AssignmentRuleRepository, AssignmentRuleRepositoryError, LeadWorkloadError,
        LeadWorkloadReader,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating an assignment rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssignmentRuleRequest {
    name: String,
    strategy: AssignmentStrategy,
    candidates: Vec<UserId>,
    filters: AssignmentFilters,
}

impl CreateAssignmentRuleRequest {
    /// Creates an unfiltered request for the given strategy and candidates.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        strategy: AssignmentStrategy,
        candidates: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            candidates: candidates.into_iter().collect(),
            filters: AssignmentFilters::default(),
        }
    }

    /// Sets the lead filters.
    #[must_use]
    pub fn with_filters(mut self, filters: AssignmentFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Service-level errors for assignment operations.
#[derive(Debug, Error)]
pub enum LeadAssignmentError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),
    /// Rule repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRuleRepositoryError),
    /// Lead workload lookup failed.
    #[error(transparent)]
    Workload(#[from] LeadWorkloadError),
    /// No rule exists with the given identifier.
    #[error("assignment rule {0} not found")]
    NotFound(AssignmentRuleId),
}

/// Result type for assignment service operations.
pub type LeadAssignmentResult<T> = Result<T, LeadAssignmentError>;

/// Lead auto-assignment orchestration service.
#[derive(Clone)]
pub struct LeadAssignmentService<R, W, C>
where
    R: AssignmentRuleRepository,
    W: LeadWorkloadReader,
    C: Clock + Send + Sync,
{
    rules: Arc<R>,
    workload: Arc<W>,
    clock: Arc<C>,
}

impl<R, W, C> LeadAssignmentService<R, W, C>
where
    R: AssignmentRuleRepository,
    W: LeadWorkloadReader,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub const fn new(rules: Arc<R>, workload: Arc<W>, clock: Arc<C>) -> Self {
        Self {
            rules,
            workload,
            clock,
        }
    }

    /// Picks the owner for a new lead.
    ///
    /// Active rules are tried in creation order and the first whose filters
    /// accept the lead decides the outcome. Returns `Ok(None)` when no rule
    /// matches or the matching rule has no candidates.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError`] when rule or workload lookups fail.
    pub async fn assign_lead(
        &self,
        lead: &LeadAttributes,
    ) -> LeadAssignmentResult<Option<UserId>> {
        let rules = self.rules.list_active().await?;
        let Some(rule) = rules.into_iter().find(|rule| rule.matches(lead)) else {
            debug!("no active assignment rule matched lead");
            return Ok(None);
        };

        if rule.candidates().is_empty() {
            warn!(rule_id = %rule.id(), rule = %rule.name(), "matching assignment rule has no candidates");
            return Ok(None);
        }

        let picked = match rule.strategy() {
            AssignmentStrategy::RoundRobin => self.pick_round_robin(&rule).await?,
            AssignmentStrategy::LoadBalance => self.pick_least_loaded(&rule).await?,
        };

        if let Some(user_id) = picked {
            debug!(
                rule_id = %rule.id(),
                strategy = %rule.strategy(),
                user_id = %user_id,
                "lead assigned"
            );
        }
        Ok(picked)
    }

    async fn pick_round_robin(
        &self,
        rule: &AssignmentRule,
    ) -> LeadAssignmentResult<Option<UserId>> {
        let pick = self
            .rules
            .advance_rotation(rule.id(), self.clock.utc())
            .await?;
        Ok(pick.map(|slot| slot.user_id))
    }

    async fn pick_least_loaded(
        &self,
        rule: &AssignmentRule,
    ) -> LeadAssignmentResult<Option<UserId>> {
        let counts = self.workload.open_lead_counts(rule.candidates()).await?;
        // min_by_key keeps the first minimum, so ties go to list order.
        Ok(rule
            .candidates()
            .iter()
            .copied()
            .min_by_key(|user| counts.get(user).copied().unwrap_or(0)))
    }

    /// Creates and persists a new active rule.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError`] when the name is invalid or the
    /// repository rejects persistence.
    pub async fn create_rule(
        &self,
        request: CreateAssignmentRuleRequest,
    ) -> LeadAssignmentResult<AssignmentRule> {
        let name = AssignmentRuleName::new(request.name)?;
        let rule = AssignmentRule::new(
            name,
            request.strategy,
            request.candidates,
            request.filters,
            &*self.clock,
        );
        self.rules.store(&rule).await?;
        info!(rule_id = %rule.id(), strategy = %rule.strategy(), "assignment rule created");
        Ok(rule)
    }

    /// Finds a rule by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::Repository`] when lookup fails.
    pub async fn find_rule(
        &self,
        rule_id: AssignmentRuleId,
    ) -> LeadAssignmentResult<Option<AssignmentRule>> {
        Ok(self.rules.find_by_id(rule_id).await?)
    }

    /// Lists every rule in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::Repository`] when lookup fails.
    pub async fn list_rules(&self) -> LeadAssignmentResult<Vec<AssignmentRule>> {
        Ok(self.rules.list_all().await?)
    }

    /// Replaces a rule's candidate list.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::NotFound`] when the rule does not exist,
    /// or repository errors.
    pub async fn replace_candidates(
        &self,
        rule_id: AssignmentRuleId,
        candidates: Vec<UserId>,
    ) -> LeadAssignmentResult<AssignmentRule> {
        let mut rule = self.find_rule_or_error(rule_id).await?;
        rule.replace_candidates(candidates, &*self.clock);
        self.rules.update(&rule).await?;
        Ok(rule)
    }

    /// Replaces a rule's lead filters.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::NotFound`] when the rule does not exist,
    /// or repository errors.
    pub async fn replace_filters(
        &self,
        rule_id: AssignmentRuleId,
        filters: AssignmentFilters,
    ) -> LeadAssignmentResult<AssignmentRule> {
        let mut rule = self.find_rule_or_error(rule_id).await?;
        rule.replace_filters(filters, &*self.clock);
        self.rules.update(&rule).await?;
        Ok(rule)
    }

    /// Re-enables a rule.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::NotFound`] when the rule does not exist,
    /// or repository errors.
    pub async fn activate(&self, rule_id: AssignmentRuleId) -> LeadAssignmentResult<AssignmentRule> {
        let mut rule = self.find_rule_or_error(rule_id).await?;
        rule.activate(&*self.clock);
        self.rules.update(&rule).await?;
        Ok(rule)
    }

    /// Excludes a rule from assignment.
    ///
    /// # Errors
    ///
    /// Returns [`LeadAssignmentError::NotFound`] when the rule does not exist,
    /// or repository errors.
    pub async fn deactivate(
        &self,
        rule_id: AssignmentRuleId,
    ) -> LeadAssignmentResult<AssignmentRule> {
        let mut rule = self.find_rule_or_error(rule_id).await?;
        rule.deactivate(&*self.clock);
        self.rules.update(&rule).await?;
        Ok(rule)
    }

    async fn find_rule_or_error(
        &self,
        rule_id: AssignmentRuleId,
    ) -> LeadAssignmentResult<AssignmentRule> {
        self.rules
            .find_by_id(rule_id)
            .await?
            .ok_or(LeadAssignmentError::NotFound(rule_id))
    }
}
