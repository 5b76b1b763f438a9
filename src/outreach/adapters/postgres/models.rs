//! Diesel row models for outreach persistence.

use super::schema::{activities, contacts, email_templates, queued_emails};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for email templates.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = email_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailTemplateRow {
    /// Template identifier.
    pub id: uuid::Uuid,
    /// Template name.
    pub name: String,
    /// Subject template.
    pub subject: String,
    /// Body template.
    pub body: String,
}

/// Query result row for contacts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContactRow {
    /// Contact identifier.
    pub id: uuid::Uuid,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Company name.
    pub company: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

/// Insert model for queued emails.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = queued_emails)]
pub struct NewQueuedEmailRow {
    /// Queue record identifier.
    pub id: uuid::Uuid,
    /// Recipient contact.
    pub contact_id: uuid::Uuid,
    /// Source template.
    pub template_id: uuid::Uuid,
    /// Recipient address.
    pub recipient: String,
    /// Rendered subject.
    pub subject: String,
    /// Rendered body.
    pub body: String,
    /// Delivery status.
    pub status: String,
    /// Origin payload.
    pub origin: Option<Value>,
    /// Queue timestamp.
    pub queued_at: DateTime<Utc>,
}

/// Insert model for activities.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivityRow {
    /// Activity identifier.
    pub id: uuid::Uuid,
    /// Contact the activity belongs to.
    pub contact_id: uuid::Uuid,
    /// Activity kind.
    pub kind: String,
    /// Description.
    pub description: String,
    /// Due time.
    pub due_at: Option<DateTime<Utc>>,
    /// Origin payload.
    pub origin: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
