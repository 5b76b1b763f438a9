//! Domain model for sales sequences.
//!
//! A sequence is an ordered list of email, wait and task steps. Each
//! enrollment walks one contact through those steps on a due-date schedule;
//! running the steps themselves goes through the outreach ports.

mod enrollment;
mod error;
mod ids;
mod outcome;
mod schedule;
mod sequence;
mod step;

pub use enrollment::{Enrollment, EnrollmentStatus, PersistedEnrollmentData};
pub use error::{ParseEnrollmentStatusError, ParseSchedulePolicyError, SequenceDomainError};
pub use ids::{EnrollmentId, SequenceId, SequenceName};
pub use outcome::{CompletionReason, StepOutcome, StepResult};
pub use schedule::SchedulePolicy;
pub use sequence::{PersistedSequenceData, Sequence};
pub use step::SequenceStep;
