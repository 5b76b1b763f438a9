//! Sales sequence aggregate root.

use super::{SequenceDomainError, SequenceId, SequenceName, SequenceStep};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Ordered list of outreach steps contacts are enrolled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    id: SequenceId,
    name: SequenceName,
    steps: Vec<SequenceStep>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSequenceData {
    /// Persisted sequence identifier.
    pub id: SequenceId,
    /// Persisted name.
    pub name: SequenceName,
    /// Persisted steps in execution order.
    pub steps: Vec<SequenceStep>,
    /// Persisted activation flag.
    pub is_active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Sequence {
    /// Creates a new active sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::EmptyTaskDescription`] when a task step
    /// has a blank description, or [`SequenceDomainError::StepDelayTooLong`]
    /// when a step waits longer than [`SequenceStep::MAX_DELAY_DAYS`].
    pub fn new(
        name: SequenceName,
        steps: Vec<SequenceStep>,
        clock: &impl Clock,
    ) -> Result<Self, SequenceDomainError> {
        validate_steps(&steps)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: SequenceId::new(),
            name,
            steps,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a sequence from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSequenceData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            steps: data.steps,
            is_active: data.is_active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the sequence identifier.
    #[must_use]
    pub const fn id(&self) -> SequenceId {
        self.id
    }

    /// Returns the sequence name.
    #[must_use]
    pub const fn name(&self) -> &SequenceName {
        &self.name
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    /// Returns the step at `index`, if any.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&SequenceStep> {
        self.steps.get(index)
    }

    /// Returns whether the sequence accepts new enrollments.
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

    /// Stops accepting new enrollments. Existing enrollments keep running.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.is_active = false;
        self.touch(clock);
    }

    /// Accepts new enrollments again.
    pub fn activate(&mut self, clock: &impl Clock) {
        self.is_active = true;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_steps(steps: &[SequenceStep]) -> Result<(), SequenceDomainError> {
    for (index, step) in steps.iter().enumerate() {
        let delay_days = step.delay_days();
        if delay_days > SequenceStep::MAX_DELAY_DAYS {
            return Err(SequenceDomainError::StepDelayTooLong { index, delay_days });
        }
        if let SequenceStep::Task { description, .. } = step {
            if description.trim().is_empty() {
                return Err(SequenceDomainError::EmptyTaskDescription { index });
            }
        }
    }
    Ok(())
}
