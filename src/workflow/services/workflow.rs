//! Service layer for workflow rule management and evaluation.

use crate::cache::TtlCache;
use crate::config::WorkflowConfig;
use crate::workflow::{
    domain::{
        Condition, ConditionOperator, EntityEvent, EvaluationMode, RuleResult, Trigger,
        WorkflowDomainError, WorkflowExecution, WorkflowRule, WorkflowRuleId, WorkflowRuleName,
    },
    ports::{
        ExecutionLogError, WorkflowExecutionLog, WorkflowRuleRepository,
        WorkflowRuleRepositoryError,
    },
};
use mockable::Clock;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Unvalidated condition as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSpec {
    field: String,
    operator: String,
    value: Value,
}

impl ConditionSpec {
    /// Creates an unvalidated condition.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    fn validate(self) -> Result<Condition, WorkflowDomainError> {
        Condition::new(
            self.field,
            ConditionOperator::parse(&self.operator),
            self.value,
        )
    }
}

/// Request payload for creating a workflow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkflowRuleRequest {
    name: String,
    trigger: Trigger,
    condition: Option<ConditionSpec>,
    actions: Vec<Value>,
}

impl CreateWorkflowRuleRequest {
    /// Creates a request for an unconditional rule with no actions.
    #[must_use]
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            name: name.into(),
            trigger,
            condition: None,
            actions: Vec::new(),
        }
    }

    /// Sets the condition.
    #[must_use]
    pub fn with_condition(mut self, condition: ConditionSpec) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Sets the action list.
    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Value>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }
}

/// Service-level errors for workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),
    /// Rule repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRuleRepositoryError),
    /// Execution log operation failed.
    #[error(transparent)]
    ExecutionLog(#[from] ExecutionLogError),
    /// No rule exists with the given identifier.
    #[error("workflow rule {0} not found")]
    RuleNotFound(WorkflowRuleId),
}

/// Result type for workflow service operations.
pub type WorkflowServiceResult<T> = Result<T, WorkflowServiceError>;

type RuleCache<C> = TtlCache<Trigger, Vec<WorkflowRule>, C>;

/// Workflow orchestration service.
///
/// Active-rule lookups are cached per trigger; every rule write through this
/// service invalidates the affected trigger. A lookup that overlaps a write
/// still returns what it read but leaves the cache empty.
#[derive(Clone)]
pub struct WorkflowService<R, L, C>
where
    R: WorkflowRuleRepository,
    L: WorkflowExecutionLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    execution_log: Arc<L>,
    clock: Arc<C>,
    cache: Arc<Mutex<RuleCache<C>>>,
}

impl<R, L, C> WorkflowService<R, L, C>
where
    R: WorkflowRuleRepository,
    L: WorkflowExecutionLog,
    C: Clock + Send + Sync,
{
    /// Creates a new workflow service with default cache settings.
    #[must_use]
    pub fn new(repository: Arc<R>, execution_log: Arc<L>, clock: Arc<C>) -> Self {
        Self::with_config(repository, execution_log, clock, WorkflowConfig::default())
    }

    /// Creates a new workflow service with explicit cache settings.
    #[must_use]
    pub fn with_config(
        repository: Arc<R>,
        execution_log: Arc<L>,
        clock: Arc<C>,
        config: WorkflowConfig,
    ) -> Self {
        let cache = TtlCache::new(
            config.rule_cache_ttl(),
            config.rule_cache_capacity,
            Arc::clone(&clock),
        );
        Self {
            repository,
            execution_log,
            clock,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Creates and persists a new active rule.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Domain`] for a blank name, a blank
    /// condition field or an unsupported operator, or repository errors.
    pub async fn create_rule(
        &self,
        request: CreateWorkflowRuleRequest,
    ) -> WorkflowServiceResult<WorkflowRule> {
        let name = WorkflowRuleName::new(request.name)?;
        let condition = request.condition.map(ConditionSpec::validate).transpose()?;
        let rule = WorkflowRule::new(
            name,
            request.trigger,
            condition,
            request.actions,
            &*self.clock,
        );
        self.repository.store(&rule).await?;
        self.invalidate(rule.trigger());
        info!(rule_id = %rule.id(), trigger = %rule.trigger(), "workflow rule created");
        Ok(rule)
    }

    /// Replaces or clears a rule's condition.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::RuleNotFound`] when the rule does not
    /// exist, [`WorkflowServiceError::Domain`] for an invalid condition, or
    /// repository errors.
    pub async fn replace_condition(
        &self,
        rule_id: WorkflowRuleId,
        condition: Option<ConditionSpec>,
    ) -> WorkflowServiceResult<WorkflowRule> {
        let validated = condition.map(ConditionSpec::validate).transpose()?;
        let mut rule = self.rule_or_error(rule_id).await?;
        rule.replace_condition(validated, &*self.clock);
        self.save(&rule).await?;
        Ok(rule)
    }

    /// Replaces a rule's action list.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::RuleNotFound`] when the rule does not
    /// exist, or repository errors.
    pub async fn replace_actions(
        &self,
        rule_id: WorkflowRuleId,
        actions: Vec<Value>,
    ) -> WorkflowServiceResult<WorkflowRule> {
        let mut rule = self.rule_or_error(rule_id).await?;
        rule.replace_actions(actions, &*self.clock);
        self.save(&rule).await?;
        Ok(rule)
    }

    /// Includes a rule in evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::RuleNotFound`] when the rule does not
    /// exist, or repository errors.
    pub async fn activate_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> WorkflowServiceResult<WorkflowRule> {
        let mut rule = self.rule_or_error(rule_id).await?;
        rule.activate(&*self.clock);
        self.save(&rule).await?;
        Ok(rule)
    }

    /// Excludes a rule from evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::RuleNotFound`] when the rule does not
    /// exist, or repository errors.
    pub async fn deactivate_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> WorkflowServiceResult<WorkflowRule> {
        let mut rule = self.rule_or_error(rule_id).await?;
        rule.deactivate(&*self.clock);
        self.save(&rule).await?;
        Ok(rule)
    }

    /// Deletes a rule. Its execution log entries are kept.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::RuleNotFound`] when the rule does not
    /// exist, or repository errors.
    pub async fn delete_rule(&self, rule_id: WorkflowRuleId) -> WorkflowServiceResult<()> {
        let deleted = self.repository.delete(rule_id).await.map_err(|err| match err {
            WorkflowRuleRepositoryError::NotFound(id) => WorkflowServiceError::RuleNotFound(id),
            other => WorkflowServiceError::Repository(other),
        })?;
        self.invalidate(deleted.trigger());
        info!(rule_id = %rule_id, "workflow rule deleted");
        Ok(())
    }

    /// Finds a rule by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Repository`] when lookup fails.
    pub async fn find_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> WorkflowServiceResult<Option<WorkflowRule>> {
        Ok(self.repository.find_by_id(rule_id).await?)
    }

    /// Lists every rule in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Repository`] when lookup fails.
    pub async fn list_rules(&self) -> WorkflowServiceResult<Vec<WorkflowRule>> {
        Ok(self.repository.list_all().await?)
    }

    /// Lists the recorded executions of a rule, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::ExecutionLog`] when lookup fails.
    pub async fn list_executions(
        &self,
        rule_id: WorkflowRuleId,
    ) -> WorkflowServiceResult<Vec<WorkflowExecution>> {
        Ok(self.execution_log.list_for_rule(rule_id).await?)
    }

    /// Evaluates every active rule listening to the event's trigger, in
    /// creation order.
    ///
    /// In [`EvaluationMode::Live`] one execution is recorded per evaluated
    /// rule; [`EvaluationMode::DryRun`] records nothing.
    ///
    /// # Errors
    ///
    /// Returns repository or execution log errors. Conditions that cannot be
    /// evaluated are non-matches, not errors.
    pub async fn evaluate_rules(
        &self,
        event: &EntityEvent,
        mode: EvaluationMode,
    ) -> WorkflowServiceResult<Vec<RuleResult>> {
        let rules = self.active_rules(event.trigger).await?;
        let evaluated_at = self.clock.utc();
        let mut results = Vec::with_capacity(rules.len());

        for rule in &rules {
            let matched = rule.matches(&event.data);
            let execution_id = if mode.persists() {
                let execution = WorkflowExecution::record(rule, event, matched, evaluated_at);
                self.execution_log.record(&execution).await?;
                Some(execution.id())
            } else {
                None
            };
            debug!(
                rule_id = %rule.id(),
                entity_id = %event.entity_id,
                matched,
                "workflow rule evaluated"
            );
            results.push(RuleResult {
                rule_id: rule.id(),
                rule_name: rule.name().as_str().to_owned(),
                matched,
                actions: if matched {
                    rule.actions().to_vec()
                } else {
                    Vec::new()
                },
                execution_id,
            });
        }

        info!(
            trigger = %event.trigger,
            entity_id = %event.entity_id,
            evaluated = results.len(),
            matched = results.iter().filter(|result| result.matched).count(),
            dry_run = !mode.persists(),
            "workflow evaluation finished"
        );
        Ok(results)
    }

    async fn active_rules(&self, trigger: Trigger) -> WorkflowServiceResult<Vec<WorkflowRule>> {
        let seen = {
            let mut cache = self.lock_cache();
            if let Some(rules) = cache.get(&trigger) {
                debug!(%trigger, "active rules served from cache");
                return Ok(rules);
            }
            cache.generation()
        };
        let rules = self.repository.list_active_for(trigger).await?;
        if !self.lock_cache().insert_if_unchanged(trigger, rules.clone(), seen) {
            debug!(%trigger, "rules changed during lookup; not caching");
        }
        Ok(rules)
    }

    async fn rule_or_error(&self, rule_id: WorkflowRuleId) -> WorkflowServiceResult<WorkflowRule> {
        self.repository
            .find_by_id(rule_id)
            .await?
            .ok_or(WorkflowServiceError::RuleNotFound(rule_id))
    }

    async fn save(&self, rule: &WorkflowRule) -> WorkflowServiceResult<()> {
        self.repository.update(rule).await?;
        self.invalidate(rule.trigger());
        info!(rule_id = %rule.id(), active = rule.is_active(), "workflow rule updated");
        Ok(())
    }

    fn invalidate(&self, trigger: Trigger) {
        self.lock_cache().invalidate(&trigger);
    }

    fn lock_cache(&self) -> MutexGuard<'_, RuleCache<C>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
