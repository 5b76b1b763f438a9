//! Entity events that fire workflow rules.

use super::{ParseEntityKindError, ParseTriggerEventError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CRM entity a rule listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Sales lead.
    Lead,
    /// Contact person.
    Contact,
    /// Company account.
    Company,
    /// Sales opportunity.
    Opportunity,
    /// Timeline activity.
    Activity,
}

impl EntityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Contact => "contact",
            Self::Company => "company",
            Self::Opportunity => "opportunity",
            Self::Activity => "activity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = ParseEntityKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "lead" => Ok(Self::Lead),
            "contact" => Ok(Self::Contact),
            "company" => Ok(Self::Company),
            "opportunity" => Ok(Self::Opportunity),
            "activity" => Ok(Self::Activity),
            _ => Err(ParseEntityKindError(value.to_owned())),
        }
    }
}

/// Lifecycle event on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// The entity was created.
    Created,
    /// The entity was updated.
    Updated,
    /// The entity was deleted.
    Deleted,
    /// The entity's status field changed.
    StatusChanged,
}

impl TriggerEvent {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TriggerEvent {
    type Error = ParseTriggerEventError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            "status_changed" => Ok(Self::StatusChanged),
            _ => Err(ParseTriggerEventError(value.to_owned())),
        }
    }
}

/// Entity and event pair a rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    /// Entity kind.
    pub entity: EntityKind,
    /// Event on that entity.
    pub event: TriggerEvent,
}

impl Trigger {
    /// Creates a trigger.
    #[must_use]
    pub const fn new(entity: EntityKind, event: TriggerEvent) -> Self {
        Self { entity, event }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.event)
    }
}
