//! `PostgreSQL` activity recorder.

use super::{email_queue::OutreachPgPool, models::NewActivityRow, schema::activities};
use crate::outreach::{
    domain::{Activity, FollowUpTask},
    ports::{ActivityRecorder, ActivityRecorderError, ActivityRecorderResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Activity recorder writing to the `activities` table.
#[derive(Debug, Clone)]
pub struct PostgresActivityRecorder {
    pool: OutreachPgPool,
}

impl PostgresActivityRecorder {
    /// Creates a new recorder from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: OutreachPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRecorder for PostgresActivityRecorder {
    async fn create_follow_up(
        &self,
        task: &FollowUpTask,
        created_at: DateTime<Utc>,
    ) -> ActivityRecorderResult<Activity> {
        let activity = Activity::from_follow_up(task, created_at);
        let row = NewActivityRow {
            id: activity.id().into_inner(),
            contact_id: activity.contact_id().into_inner(),
            kind: activity.kind().as_str().to_owned(),
            description: activity.description().to_owned(),
            due_at: activity.due_at(),
            origin: activity
                .origin()
                .map(serde_json::to_value)
                .transpose()
                .map_err(ActivityRecorderError::persistence)?,
            created_at: activity.created_at(),
        };

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ActivityRecorderError::persistence)?;
            diesel::insert_into(activities::table)
                .values(&row)
                .execute(&mut connection)
                .map_err(ActivityRecorderError::persistence)?;
            Ok::<_, ActivityRecorderError>(())
        })
        .await
        .map_err(ActivityRecorderError::persistence)??;
        Ok(activity)
    }
}
