//! Per-enrollment results reported by a step sweep.

use super::{EnrollmentId, SequenceId};
use crate::outreach::domain::{ActivityId, ContactId, QueuedEmailId};
use serde::{Deserialize, Serialize};

/// Why an enrollment completed without running a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The sequence has no steps.
    NoSteps,
    /// The cursor was already past the last step.
    AllStepsDone,
}

impl CompletionReason {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSteps => "no_steps",
            Self::AllStepsDone => "all_steps_done",
        }
    }
}

/// What happened to one due enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// An email step queued a message.
    EmailQueued {
        /// Queue record identifier.
        email_id: QueuedEmailId,
    },
    /// A task step created a follow-up activity.
    TaskCreated {
        /// Activity identifier.
        activity_id: ActivityId,
    },
    /// A wait step elapsed.
    Waited,
    /// The enrollment completed without running a step.
    Completed {
        /// Reason for completion.
        reason: CompletionReason,
    },
    /// The step failed; the enrollment kept its step cursor.
    Error {
        /// Failure description.
        message: String,
    },
}

impl StepOutcome {
    /// Returns the status label reported for this outcome.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::EmailQueued { .. } => "email_queued",
            Self::TaskCreated { .. } => "task_created",
            Self::Waited => "waited",
            Self::Completed { reason } => reason.as_str(),
            Self::Error { .. } => "error",
        }
    }

    /// Returns whether the outcome is a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Result reported for one enrollment processed by a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Enrollment processed.
    pub enrollment_id: EnrollmentId,
    /// Sequence the enrollment belongs to.
    pub sequence_id: SequenceId,
    /// Enrolled contact.
    pub contact_id: ContactId,
    /// Step index the sweep looked at.
    pub step_index: usize,
    /// Outcome of the step.
    pub outcome: StepOutcome,
    /// Whether the enrollment reached completion during this sweep.
    pub completed: bool,
}
