//! Lead ownership port consulted by load-balanced assignment.

use crate::assignment::domain::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for lead workload lookups.
pub type LeadWorkloadResult<T> = Result<T, LeadWorkloadError>;

/// Read access to how many open leads each user owns.
#[async_trait]
pub trait LeadWorkloadReader: Send + Sync {
    /// Counts leads owned by each of `users` whose status is open
    /// (`new`, `contacted` or `qualified`).
    ///
    /// Users without open leads may be absent from the returned map.
    async fn open_lead_counts(&self, users: &[UserId])
    -> LeadWorkloadResult<HashMap<UserId, u64>>;
}

/// Errors returned by lead workload adapters.
#[derive(Debug, Clone, Error)]
pub enum LeadWorkloadError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LeadWorkloadError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
