//! Step definitions stored on a sequence.

use crate::outreach::domain::EmailTemplateId;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// One step of a sales sequence.
///
/// `delay_days` is measured from the moment the previous step ran (or the
/// enrollment started, for the first step).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SequenceStep {
    /// Queue an email rendered from a template.
    Email {
        /// Days to wait before the step is due.
        #[serde(default)]
        delay_days: u32,
        /// Template rendered for the contact.
        template_id: EmailTemplateId,
    },
    /// Do nothing; only the delay matters.
    Wait {
        /// Days to wait before the step is due.
        #[serde(default)]
        delay_days: u32,
    },
    /// Create a follow-up task for the contact owner.
    Task {
        /// Days to wait before the step is due.
        #[serde(default)]
        delay_days: u32,
        /// Task description.
        description: String,
    },
}

impl SequenceStep {
    /// Longest delay a step may declare, roughly ten years.
    pub const MAX_DELAY_DAYS: u32 = 3_650;

    /// Creates an email step.
    #[must_use]
    pub const fn email(delay_days: u32, template_id: EmailTemplateId) -> Self {
        Self::Email {
            delay_days,
            template_id,
        }
    }

    /// Creates a wait step.
    #[must_use]
    pub const fn wait(delay_days: u32) -> Self {
        Self::Wait { delay_days }
    }

    /// Creates a task step.
    #[must_use]
    pub fn task(delay_days: u32, description: impl Into<String>) -> Self {
        Self::Task {
            delay_days,
            description: description.into(),
        }
    }

    /// Returns the configured delay in days.
    #[must_use]
    pub const fn delay_days(&self) -> u32 {
        match self {
            Self::Email { delay_days, .. }
            | Self::Wait { delay_days }
            | Self::Task { delay_days, .. } => *delay_days,
        }
    }

    /// Returns the configured delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::days(i64::from(self.delay_days()))
    }

    /// Returns the step kind as stored in the `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Email { .. } => "email",
            Self::Wait { .. } => "wait",
            Self::Task { .. } => "task",
        }
    }
}
