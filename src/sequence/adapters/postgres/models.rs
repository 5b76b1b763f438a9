//! Diesel row models for sequence persistence.

use super::schema::{sequence_enrollments, sequences};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for sequences.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sequences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SequenceRow {
    /// Sequence identifier.
    pub id: uuid::Uuid,
    /// Sequence name.
    pub name: String,
    /// Step definitions JSON payload.
    pub steps: Value,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for sequences.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = sequences)]
pub struct NewSequenceRow {
    /// Sequence identifier.
    pub id: uuid::Uuid,
    /// Sequence name.
    pub name: String,
    /// Step definitions JSON payload.
    pub steps: Value,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for enrollments.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sequence_enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnrollmentRow {
    /// Enrollment identifier.
    pub id: uuid::Uuid,
    /// Sequence identifier.
    pub sequence_id: uuid::Uuid,
    /// Enrolled contact.
    pub contact_id: uuid::Uuid,
    /// Step cursor.
    pub current_step: i32,
    /// Lifecycle status.
    pub status: String,
    /// Due time of the next step.
    pub next_step_at: Option<DateTime<Utc>>,
    /// Time of the latest sweep attempt.
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// Enrollment start.
    pub started_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for enrollments.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = sequence_enrollments)]
#[diesel(treat_none_as_null = true)]
pub struct NewEnrollmentRow {
    /// Enrollment identifier.
    pub id: uuid::Uuid,
    /// Sequence identifier.
    pub sequence_id: uuid::Uuid,
    /// Enrolled contact.
    pub contact_id: uuid::Uuid,
    /// Step cursor.
    pub current_step: i32,
    /// Lifecycle status.
    pub status: String,
    /// Due time of the next step.
    pub next_step_at: Option<DateTime<Utc>>,
    /// Time of the latest sweep attempt.
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// Enrollment start.
    pub started_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
