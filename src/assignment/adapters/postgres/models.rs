//! Diesel row models for assignment persistence.

use super::schema::assignment_rules;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for assignment rules.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignment_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Rule name.
    pub name: String,
    /// Dispatch strategy.
    pub strategy: String,
    /// Ordered candidate user identifiers.
    pub candidate_user_ids: Vec<uuid::Uuid>,
    /// Filters JSON payload.
    pub filters: Value,
    /// Rotation cursor, `-1` when unset.
    pub last_assigned_index: i32,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for assignment rules.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = assignment_rules)]
pub struct NewAssignmentRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Rule name.
    pub name: String,
    /// Dispatch strategy.
    pub strategy: String,
    /// Ordered candidate user identifiers.
    pub candidate_user_ids: Vec<uuid::Uuid>,
    /// Filters JSON payload.
    pub filters: Value,
    /// Rotation cursor, `-1` when unset.
    pub last_assigned_index: i32,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row returned by the atomic rotation update.
#[derive(Debug, Clone, QueryableByName)]
pub struct RotationRow {
    /// New cursor value.
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub last_assigned_index: i32,
    /// Candidate at the new cursor.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub user_id: uuid::Uuid,
}
