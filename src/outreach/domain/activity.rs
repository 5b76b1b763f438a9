//! Follow-up activities created by automation.

use super::{ActivityId, ContactId, OutreachDomainError, OutreachOrigin, ParseActivityKindError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of CRM activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A to-do item for the contact owner.
    Task,
    /// A phone call.
    Call,
    /// A meeting.
    Meeting,
    /// A free-form note.
    Note,
}

impl ActivityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityKind {
    type Error = ParseActivityKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "call" => Ok(Self::Call),
            "meeting" => Ok(Self::Meeting),
            "note" => Ok(Self::Note),
            _ => Err(ParseActivityKindError(value.to_owned())),
        }
    }
}

/// Request to create a follow-up task for a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpTask {
    contact_id: ContactId,
    description: String,
    due_at: DateTime<Utc>,
    origin: Option<OutreachOrigin>,
}

impl FollowUpTask {
    /// Creates a follow-up task request.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachDomainError::EmptyTaskDescription`] when the
    /// description is blank.
    pub fn new(
        contact_id: ContactId,
        description: impl Into<String>,
        due_at: DateTime<Utc>,
    ) -> Result<Self, OutreachDomainError> {
        let trimmed = description.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(OutreachDomainError::EmptyTaskDescription);
        }
        Ok(Self {
            contact_id,
            description: trimmed,
            due_at,
            origin: None,
        })
    }

    /// Sets the origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: OutreachOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns the contact.
    #[must_use]
    pub const fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the due time.
    #[must_use]
    pub const fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> Option<&OutreachOrigin> {
        self.origin.as_ref()
    }
}

/// Persisted CRM activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    id: ActivityId,
    contact_id: ContactId,
    kind: ActivityKind,
    description: String,
    due_at: Option<DateTime<Utc>>,
    origin: Option<OutreachOrigin>,
    created_at: DateTime<Utc>,
}

impl Activity {
    /// Creates a task activity from a follow-up request.
    #[must_use]
    pub fn from_follow_up(task: &FollowUpTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            contact_id: task.contact_id(),
            kind: ActivityKind::Task,
            description: task.description().to_owned(),
            due_at: Some(task.due_at()),
            origin: task.origin().copied(),
            created_at,
        }
    }

    /// Returns the activity identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the contact.
    #[must_use]
    pub const fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    /// Returns the activity kind.
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        self.kind
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the due time, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> Option<&OutreachOrigin> {
        self.origin.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
