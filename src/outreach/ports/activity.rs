//! Activity port used by automation to create follow-up tasks.

use crate::outreach::domain::{Activity, FollowUpTask};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity recorder operations.
pub type ActivityRecorderResult<T> = Result<T, ActivityRecorderError>;

/// Creates activities on a contact's timeline.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    /// Creates a `task` activity for the follow-up.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError`] when the activity cannot be stored.
    async fn create_follow_up(
        &self,
        task: &FollowUpTask,
        created_at: DateTime<Utc>,
    ) -> ActivityRecorderResult<Activity>;
}

/// Errors returned by activity recorder adapters.
#[derive(Debug, Clone, Error)]
pub enum ActivityRecorderError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityRecorderError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
