//! Workflow rule aggregate root.

use super::{Condition, Trigger, WorkflowRuleId, WorkflowRuleName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rule that fires its actions when a trigger event satisfies its condition.
///
/// Actions are opaque to the evaluator; they are echoed back in results and
/// execution logs for a downstream executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRule {
    id: WorkflowRuleId,
    name: WorkflowRuleName,
    trigger: Trigger,
    condition: Option<Condition>,
    actions: Vec<Value>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWorkflowRuleData {
    /// Persisted rule identifier.
    pub id: WorkflowRuleId,
    /// Persisted name.
    pub name: WorkflowRuleName,
    /// Persisted trigger.
    pub trigger: Trigger,
    /// Persisted condition.
    pub condition: Option<Condition>,
    /// Persisted action list.
    pub actions: Vec<Value>,
    /// Persisted activation flag.
    pub is_active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRule {
    /// Creates a new active rule.
    #[must_use]
    pub fn new(
        name: WorkflowRuleName,
        trigger: Trigger,
        condition: Option<Condition>,
        actions: Vec<Value>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: WorkflowRuleId::new(),
            name,
            trigger,
            condition,
            actions,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a rule from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkflowRuleData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            trigger: data.trigger,
            condition: data.condition,
            actions: data.actions,
            is_active: data.is_active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowRuleId {
        self.id
    }

    /// Returns the rule name.
    #[must_use]
    pub const fn name(&self) -> &WorkflowRuleName {
        &self.name
    }

    /// Returns the trigger.
    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Returns the condition, if any.
    #[must_use]
    pub const fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Returns the action list.
    #[must_use]
    pub fn actions(&self) -> &[Value] {
        &self.actions
    }

    /// Returns whether the rule participates in evaluation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `data` satisfies the rule. A rule without a condition
    /// always matches.
    #[must_use]
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.evaluate(data))
    }

    /// Replaces the condition.
    pub fn replace_condition(&mut self, condition: Option<Condition>, clock: &impl Clock) {
        self.condition = condition;
        self.touch(clock);
    }

    /// Replaces the action list.
    pub fn replace_actions(&mut self, actions: Vec<Value>, clock: &impl Clock) {
        self.actions = actions;
        self.touch(clock);
    }

    /// Includes the rule in evaluation.
    pub fn activate(&mut self, clock: &impl Clock) {
        self.is_active = true;
        self.touch(clock);
    }

    /// Excludes the rule from evaluation.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.is_active = false;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
