//! In-memory lead ownership ledger for load-balance tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::assignment::{
    domain::{LeadStatus, UserId},
    ports::{LeadWorkloadError, LeadWorkloadReader, LeadWorkloadResult},
};

/// Records which user owns which leads, keyed by status.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeadWorkload {
    owned: Arc<RwLock<HashMap<UserId, Vec<LeadStatus>>>>,
}

impl InMemoryLeadWorkload {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `owner` holds a lead with `status`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadWorkloadError::Persistence`] when lock acquisition fails.
    pub fn record_lead(&self, owner: UserId, status: LeadStatus) -> LeadWorkloadResult<()> {
        let mut owned = self
            .owned
            .write()
            .map_err(|err| LeadWorkloadError::persistence(std::io::Error::other(err.to_string())))?;
        owned.entry(owner).or_default().push(status);
        Ok(())
    }
}

#[async_trait]
impl LeadWorkloadReader for InMemoryLeadWorkload {
    async fn open_lead_counts(
        &self,
        users: &[UserId],
    ) -> LeadWorkloadResult<HashMap<UserId, u64>> {
        let owned = self
            .owned
            .read()
            .map_err(|err| LeadWorkloadError::persistence(std::io::Error::other(err.to_string())))?;
        let counts = users
            .iter()
            .filter_map(|user| {
                let statuses = owned.get(user)?;
                let open = statuses.iter().filter(|status| status.is_open()).count();
                Some((*user, u64::try_from(open).unwrap_or(u64::MAX)))
            })
            .collect();
        Ok(counts)
    }
}
