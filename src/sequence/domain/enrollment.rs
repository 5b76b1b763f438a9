//! Enrollment of a contact in a sequence.

use super::{EnrollmentId, ParseEnrollmentStatusError, SequenceDomainError, SequenceId};
use crate::outreach::domain::ContactId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enrollment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Steps run when they fall due.
    Active,
    /// Steps are held until the enrollment is resumed.
    Paused,
    /// Every step has run, or there was nothing to run.
    Completed,
}

impl EnrollmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    /// Returns whether no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns whether moving from `self` to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Paused | Self::Completed) | (Self::Paused, Self::Active)
        )
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EnrollmentStatus {
    type Error = ParseEnrollmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnrollmentStatusError(value.to_owned())),
        }
    }
}

/// A contact's progress through one sequence.
///
/// `current_step` only ever grows, and `next_step_at` is cleared once the
/// enrollment completes. `last_attempted_at` records the latest sweep that
/// picked the enrollment up, whether or not its step succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    id: EnrollmentId,
    sequence_id: SequenceId,
    contact_id: ContactId,
    current_step: usize,
    status: EnrollmentStatus,
    next_step_at: Option<DateTime<Utc>>,
    last_attempted_at: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEnrollmentData {
    /// Persisted enrollment identifier.
    pub id: EnrollmentId,
    /// Persisted sequence.
    pub sequence_id: SequenceId,
    /// Persisted contact.
    pub contact_id: ContactId,
    /// Persisted step cursor.
    pub current_step: usize,
    /// Persisted status.
    pub status: EnrollmentStatus,
    /// Persisted due time of the next step.
    pub next_step_at: Option<DateTime<Utc>>,
    /// Persisted time of the latest sweep attempt.
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// Persisted start timestamp.
    pub started_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Starts a new active enrollment at step zero.
    #[must_use]
    pub fn new(
        sequence_id: SequenceId,
        contact_id: ContactId,
        next_step_at: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: EnrollmentId::new(),
            sequence_id,
            contact_id,
            current_step: 0,
            status: EnrollmentStatus::Active,
            next_step_at: Some(next_step_at),
            last_attempted_at: None,
            started_at: timestamp,
            completed_at: None,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an enrollment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEnrollmentData) -> Self {
        Self {
            id: data.id,
            sequence_id: data.sequence_id,
            contact_id: data.contact_id,
            current_step: data.current_step,
            status: data.status,
            next_step_at: data.next_step_at,
            last_attempted_at: data.last_attempted_at,
            started_at: data.started_at,
            completed_at: data.completed_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the enrollment identifier.
    #[must_use]
    pub const fn id(&self) -> EnrollmentId {
        self.id
    }

    /// Returns the sequence.
    #[must_use]
    pub const fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }

    /// Returns the enrolled contact.
    #[must_use]
    pub const fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    /// Returns the index of the next step to run.
    #[must_use]
    pub const fn current_step(&self) -> usize {
        self.current_step
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> EnrollmentStatus {
        self.status
    }

    /// Returns when the next step falls due, if the enrollment is not
    /// completed.
    #[must_use]
    pub const fn next_step_at(&self) -> Option<DateTime<Utc>> {
        self.next_step_at
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when a sweep last picked the enrollment up.
    #[must_use]
    pub const fn last_attempted_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempted_at
    }

    /// Records that a sweep picked the enrollment up at `at`.
    ///
    /// Leaves the step cursor, status and due time alone.
    pub const fn record_attempt(&mut self, at: DateTime<Utc>) {
        self.last_attempted_at = Some(at);
    }

    /// Returns whether the enrollment is active and due at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == EnrollmentStatus::Active && self.next_step_at.is_some_and(|due| due <= now)
    }

    /// Holds the enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::InvalidStateTransition`] unless the
    /// enrollment is active.
    pub fn pause(&mut self, clock: &impl Clock) -> Result<(), SequenceDomainError> {
        self.transition_to(EnrollmentStatus::Paused)?;
        self.touch(clock);
        Ok(())
    }

    /// Resumes a paused enrollment and makes its next step due immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::InvalidStateTransition`] unless the
    /// enrollment is paused.
    pub fn resume(&mut self, clock: &impl Clock) -> Result<(), SequenceDomainError> {
        self.transition_to(EnrollmentStatus::Active)?;
        let now = clock.utc();
        self.next_step_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Completes the enrollment without running further steps.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::InvalidStateTransition`] unless the
    /// enrollment is active.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), SequenceDomainError> {
        self.transition_to(EnrollmentStatus::Completed)?;
        let now = clock.utc();
        self.next_step_at = None;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Records that the current step ran.
    ///
    /// Moves the cursor forward by one. When `next_step_at` is `None` there
    /// is no step left and the enrollment completes.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::EnrollmentNotActive`] unless the
    /// enrollment is active.
    pub fn advance(
        &mut self,
        next_step_at: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Result<(), SequenceDomainError> {
        if self.status != EnrollmentStatus::Active {
            return Err(SequenceDomainError::EnrollmentNotActive(self.id));
        }
        self.current_step = self.current_step.saturating_add(1);
        match next_step_at {
            Some(due) => {
                self.next_step_at = Some(due);
                self.touch(clock);
                Ok(())
            }
            None => self.complete(clock),
        }
    }

    fn transition_to(&mut self, target: EnrollmentStatus) -> Result<(), SequenceDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(SequenceDomainError::InvalidStateTransition {
                enrollment_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
