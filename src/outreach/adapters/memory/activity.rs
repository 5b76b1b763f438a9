//! In-memory activity recorder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

use crate::outreach::{
    domain::{Activity, ContactId, FollowUpTask},
    ports::{ActivityRecorder, ActivityRecorderError, ActivityRecorderResult},
};

/// Activity recorder that keeps created activities in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityRecorder {
    activities: Arc<RwLock<Vec<Activity>>>,
}

fn lock_error<T>(err: PoisonError<T>) -> ActivityRecorderError {
    ActivityRecorderError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryActivityRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the activities recorded for `contact_id` in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError::Persistence`] when lock acquisition
    /// fails.
    pub fn for_contact(&self, contact_id: ContactId) -> ActivityRecorderResult<Vec<Activity>> {
        let activities = self.activities.read().map_err(lock_error)?;
        Ok(activities
            .iter()
            .filter(|activity| activity.contact_id() == contact_id)
            .cloned()
            .collect())
    }

    /// Returns every recorded activity.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError::Persistence`] when lock acquisition
    /// fails.
    pub fn all(&self) -> ActivityRecorderResult<Vec<Activity>> {
        let activities = self.activities.read().map_err(lock_error)?;
        Ok(activities.clone())
    }
}

#[async_trait]
impl ActivityRecorder for InMemoryActivityRecorder {
    async fn create_follow_up(
        &self,
        task: &FollowUpTask,
        created_at: DateTime<Utc>,
    ) -> ActivityRecorderResult<Activity> {
        let activity = Activity::from_follow_up(task, created_at);
        let mut activities = self.activities.write().map_err(lock_error)?;
        activities.push(activity.clone());
        Ok(activity)
    }
}
