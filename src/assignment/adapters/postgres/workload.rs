//! `PostgreSQL` lead workload reader.

use super::schema::leads;
use crate::assignment::{
    domain::{LeadStatus, UserId},
    ports::{LeadWorkloadError, LeadWorkloadReader, LeadWorkloadResult},
};
use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::collections::HashMap;

/// Counts open leads per owner from the `leads` table.
#[derive(Debug, Clone)]
pub struct PostgresLeadWorkload {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresLeadWorkload {
    /// Creates a new reader from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadWorkloadReader for PostgresLeadWorkload {
    async fn open_lead_counts(
        &self,
        users: &[UserId],
    ) -> LeadWorkloadResult<HashMap<UserId, u64>> {
        let owner_ids: Vec<uuid::Uuid> = users.iter().map(|user| user.into_inner()).collect();
        let open_statuses: Vec<&'static str> =
            LeadStatus::OPEN.iter().map(|status| status.as_str()).collect();
        let pool = self.pool.clone();

        let rows = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LeadWorkloadError::persistence)?;
            leads::table
                .filter(leads::owner_id.eq_any(owner_ids))
                .filter(leads::status.eq_any(open_statuses))
                .group_by(leads::owner_id)
                .select((leads::owner_id, count_star()))
                .load::<(Option<uuid::Uuid>, i64)>(&mut connection)
                .map_err(LeadWorkloadError::persistence)
        })
        .await
        .map_err(LeadWorkloadError::persistence)??;

        let mut counts = HashMap::with_capacity(rows.len());
        for (owner_id, lead_count) in rows {
            let Some(owner) = owner_id else {
                continue;
            };
            let open = u64::try_from(lead_count).map_err(LeadWorkloadError::persistence)?;
            counts.insert(UserId::from_uuid(owner), open);
        }
        Ok(counts)
    }
}
