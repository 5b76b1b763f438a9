//! Error types for sequence domain validation and parsing.

use super::{EnrollmentId, EnrollmentStatus, SequenceId, SequenceStep};
use thiserror::Error;

/// Errors returned while constructing or mutating sequences and enrollments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequenceDomainError {
    /// The sequence name is empty after trimming.
    #[error("sequence name must not be empty")]
    EmptySequenceName,

    /// The sequence name exceeds the 255-character storage limit.
    #[error("sequence name exceeds 255 character limit: {0}")]
    SequenceNameTooLong(String),

    /// A task step has a blank description.
    #[error("task step {index} must have a description")]
    EmptyTaskDescription {
        /// Zero-based step index.
        index: usize,
    },

    /// A step waits longer than [`SequenceStep::MAX_DELAY_DAYS`].
    #[error(
        "step {index} delay of {delay_days} days exceeds the {max} day limit",
        max = SequenceStep::MAX_DELAY_DAYS
    )]
    StepDelayTooLong {
        /// Zero-based step index.
        index: usize,
        /// Rejected delay.
        delay_days: u32,
    },

    /// The due time of a step falls outside the representable calendar.
    #[error("due time of step {index} is out of range")]
    ScheduleOverflow {
        /// Zero-based step index.
        index: usize,
    },

    /// The enrollment cannot move between the given states.
    #[error("enrollment {enrollment_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Enrollment identifier.
        enrollment_id: EnrollmentId,
        /// Current status.
        from: EnrollmentStatus,
        /// Requested status.
        to: EnrollmentStatus,
    },

    /// Enrollments only advance while active.
    #[error("enrollment {0} is not active")]
    EnrollmentNotActive(EnrollmentId),

    /// The sequence does not accept new enrollments.
    #[error("sequence {0} is inactive")]
    SequenceInactive(SequenceId),
}

/// Error returned while parsing an enrollment status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown enrollment status: {0}")]
pub struct ParseEnrollmentStatusError(pub String);

/// Error returned while parsing a schedule policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown schedule policy: {0}")]
pub struct ParseSchedulePolicyError(pub String);
