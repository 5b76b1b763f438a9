//! Repository port for sequences and their enrollments.

use crate::outreach::domain::ContactId;
use crate::sequence::domain::{Enrollment, EnrollmentId, Sequence, SequenceId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for sequence repository operations.
pub type SequenceRepositoryResult<T> = Result<T, SequenceRepositoryError>;

/// Sequence and enrollment persistence contract.
#[async_trait]
pub trait SequenceRepository: Send + Sync {
    /// Stores a new sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceRepositoryError::DuplicateSequence`] when the
    /// sequence ID already exists.
    async fn store_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()>;

    /// Persists changes to an existing sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceRepositoryError::SequenceNotFound`] when the sequence
    /// does not exist.
    async fn update_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()>;

    /// Finds a sequence by identifier.
    async fn find_sequence(&self, id: SequenceId) -> SequenceRepositoryResult<Option<Sequence>>;

    /// Stores `enrollment` unless the contact already has an active
    /// enrollment in the same sequence, and returns whichever enrollment is
    /// now active.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceRepositoryError::Persistence`] on backend failure.
    async fn store_enrollment_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> SequenceRepositoryResult<Enrollment>;

    /// Persists changes to an existing enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceRepositoryError::EnrollmentNotFound`] when the
    /// enrollment does not exist.
    async fn update_enrollment(&self, enrollment: &Enrollment) -> SequenceRepositoryResult<()>;

    /// Stamps the enrollment's `last_attempted_at` without touching any
    /// other field.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceRepositoryError::EnrollmentNotFound`] when the
    /// enrollment does not exist.
    async fn record_attempt(
        &self,
        id: EnrollmentId,
        attempted_at: DateTime<Utc>,
    ) -> SequenceRepositoryResult<()>;

    /// Finds an enrollment by identifier.
    async fn find_enrollment(
        &self,
        id: EnrollmentId,
    ) -> SequenceRepositoryResult<Option<Enrollment>>;

    /// Finds the active enrollment of `contact_id` in `sequence_id`.
    async fn find_active_enrollment(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> SequenceRepositoryResult<Option<Enrollment>>;

    /// Returns every enrollment of a sequence in start order.
    async fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceRepositoryResult<Vec<Enrollment>>;

    /// Returns up to `limit` active enrollments due at `now`.
    ///
    /// Enrollments never attempted come first, then the least recently
    /// attempted; ties fall back to the oldest due time and start time.
    async fn find_due_enrollments(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SequenceRepositoryResult<Vec<Enrollment>>;
}

/// Errors returned by sequence repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SequenceRepositoryError {
    /// A sequence with the same identifier already exists.
    #[error("duplicate sequence identifier: {0}")]
    DuplicateSequence(SequenceId),

    /// The sequence was not found.
    #[error("sequence not found: {0}")]
    SequenceNotFound(SequenceId),

    /// The enrollment was not found.
    #[error("enrollment not found: {0}")]
    EnrollmentNotFound(EnrollmentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SequenceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
