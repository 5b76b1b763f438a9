//! Diesel row models for workflow persistence.

use super::schema::{workflow_executions, workflow_rules};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for workflow rules.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workflow_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Rule name.
    pub name: String,
    /// Trigger entity kind.
    pub trigger_entity: String,
    /// Trigger event.
    pub trigger_event: String,
    /// Condition JSON payload.
    pub condition: Option<Value>,
    /// Action list JSON payload.
    pub actions: Value,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for workflow rules.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = workflow_rules)]
#[diesel(treat_none_as_null = true)]
pub struct NewWorkflowRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Rule name.
    pub name: String,
    /// Trigger entity kind.
    pub trigger_entity: String,
    /// Trigger event.
    pub trigger_event: String,
    /// Condition JSON payload.
    pub condition: Option<Value>,
    /// Action list JSON payload.
    pub actions: Value,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for execution log entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = workflow_executions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowExecutionRow {
    /// Execution identifier.
    pub id: uuid::Uuid,
    /// Evaluated rule.
    pub rule_id: uuid::Uuid,
    /// Entity kind.
    pub entity_type: String,
    /// Affected entity.
    pub entity_id: uuid::Uuid,
    /// Triggering event.
    pub trigger_event: String,
    /// Evaluation status.
    pub status: String,
    /// Result payload.
    pub result: Value,
    /// Evaluation timestamp.
    pub executed_at: DateTime<Utc>,
}
