//! How the due time of the next step is computed.

use super::{ParseSchedulePolicyError, SequenceDomainError, SequenceStep};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base used when scheduling the step after the one just executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// Next step is due `delay_days` after processing time. Late sweeps push
    /// every later step back.
    #[default]
    FromNow,
    /// Next step is due at `started_at` plus the cumulative delay of every
    /// step up to and including it, regardless of when earlier steps ran.
    Anchored,
}

impl SchedulePolicy {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FromNow => "from_now",
            Self::Anchored => "anchored",
        }
    }

    /// Computes when the step at `next_index` becomes due.
    ///
    /// Returns `Ok(None)` when `next_index` is past the end of `steps`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::ScheduleOverflow`] when the due time
    /// cannot be represented.
    pub fn next_due_at(
        self,
        steps: &[SequenceStep],
        next_index: usize,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SequenceDomainError> {
        let Some(next_step) = steps.get(next_index) else {
            return Ok(None);
        };
        let due = match self {
            Self::FromNow => now.checked_add_signed(next_step.delay()),
            Self::Anchored => steps
                .iter()
                .take(next_index.saturating_add(1))
                .try_fold(Duration::zero(), |total, step| total.checked_add(&step.delay()))
                .and_then(|offset| started_at.checked_add_signed(offset)),
        };
        due.map(Some)
            .ok_or(SequenceDomainError::ScheduleOverflow { index: next_index })
    }
}

impl fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SchedulePolicy {
    type Error = ParseSchedulePolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "from_now" => Ok(Self::FromNow),
            "anchored" => Ok(Self::Anchored),
            _ => Err(ParseSchedulePolicyError(value.to_owned())),
        }
    }
}
