//! Evaluation requests, per-rule results and the execution log entry.

use super::{
    EntityKind, ParseExecutionStatusError, Trigger, TriggerEvent, WorkflowExecutionId,
    WorkflowRule, WorkflowRuleId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use uuid::Uuid;

/// Outcome recorded for one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The rule matched.
    Success,
    /// The rule did not match.
    Skipped,
}

impl ExecutionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
        }
    }

    /// Returns the status for a match decision.
    #[must_use]
    pub const fn from_matched(matched: bool) -> Self {
        if matched { Self::Success } else { Self::Skipped }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExecutionStatus {
    type Error = ParseExecutionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "success" => Ok(Self::Success),
            "skipped" => Ok(Self::Skipped),
            _ => Err(ParseExecutionStatusError(value.to_owned())),
        }
    }
}

/// Whether an evaluation records executions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EvaluationMode {
    /// Record one execution per evaluated rule.
    #[default]
    Live,
    /// Preview only; nothing is persisted.
    DryRun,
}

impl EvaluationMode {
    /// Returns whether executions are persisted.
    #[must_use]
    pub const fn persists(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Entity event submitted for rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEvent {
    /// Entity and event that occurred.
    pub trigger: Trigger,
    /// Identifier of the affected entity.
    pub entity_id: Uuid,
    /// Entity field snapshot the conditions read.
    pub data: Map<String, Value>,
}

impl EntityEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(trigger: Trigger, entity_id: Uuid, data: Map<String, Value>) -> Self {
        Self {
            trigger,
            entity_id,
            data,
        }
    }
}

/// Result of evaluating one rule against an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Evaluated rule.
    pub rule_id: WorkflowRuleId,
    /// Rule name at evaluation time.
    pub rule_name: String,
    /// Whether the condition held.
    pub matched: bool,
    /// Actions to run; empty when the rule did not match.
    pub actions: Vec<Value>,
    /// Recorded execution, absent in dry-run mode.
    pub execution_id: Option<WorkflowExecutionId>,
}

/// Append-only log entry for one rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowExecution {
    id: WorkflowExecutionId,
    rule_id: WorkflowRuleId,
    entity: EntityKind,
    entity_id: Uuid,
    event: TriggerEvent,
    status: ExecutionStatus,
    result: Value,
    executed_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWorkflowExecutionData {
    /// Persisted execution identifier.
    pub id: WorkflowExecutionId,
    /// Evaluated rule.
    pub rule_id: WorkflowRuleId,
    /// Entity kind of the event.
    pub entity: EntityKind,
    /// Affected entity identifier.
    pub entity_id: Uuid,
    /// Event that triggered evaluation.
    pub event: TriggerEvent,
    /// Recorded status.
    pub status: ExecutionStatus,
    /// Recorded result payload.
    pub result: Value,
    /// Evaluation timestamp.
    pub executed_at: DateTime<Utc>,
}

impl WorkflowExecution {
    /// Records the evaluation of `rule` against `event`.
    ///
    /// The payload is `{"matched": true, "actions": [...]}` for a match and
    /// `{"matched": false}` otherwise.
    #[must_use]
    pub fn record(
        rule: &WorkflowRule,
        event: &EntityEvent,
        matched: bool,
        executed_at: DateTime<Utc>,
    ) -> Self {
        let result = if matched {
            json!({ "matched": true, "actions": rule.actions() })
        } else {
            json!({ "matched": false })
        };
        Self {
            id: WorkflowExecutionId::new(),
            rule_id: rule.id(),
            entity: event.trigger.entity,
            entity_id: event.entity_id,
            event: event.trigger.event,
            status: ExecutionStatus::from_matched(matched),
            result,
            executed_at,
        }
    }

    /// Reconstructs an execution from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkflowExecutionData) -> Self {
        Self {
            id: data.id,
            rule_id: data.rule_id,
            entity: data.entity,
            entity_id: data.entity_id,
            event: data.event,
            status: data.status,
            result: data.result,
            executed_at: data.executed_at,
        }
    }

    /// Returns the execution identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowExecutionId {
        self.id
    }

    /// Returns the evaluated rule.
    #[must_use]
    pub const fn rule_id(&self) -> WorkflowRuleId {
        self.rule_id
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Returns the affected entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> Uuid {
        self.entity_id
    }

    /// Returns the triggering event.
    #[must_use]
    pub const fn event(&self) -> TriggerEvent {
        self.event
    }

    /// Returns the recorded status.
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Returns the result payload.
    #[must_use]
    pub const fn result(&self) -> &Value {
        &self.result
    }

    /// Returns the evaluation timestamp.
    #[must_use]
    pub const fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }
}
