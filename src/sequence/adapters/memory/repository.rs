//! In-memory repository for sequences and enrollments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::outreach::domain::ContactId;
use crate::sequence::{
    domain::{Enrollment, EnrollmentId, EnrollmentStatus, Sequence, SequenceId},
    ports::{SequenceRepository, SequenceRepositoryError, SequenceRepositoryResult},
};

/// Thread-safe in-memory sequence repository.
///
/// The active-enrollment check and insert share one write lock, so
/// concurrent enrollments of the same contact collapse into one.
#[derive(Debug, Clone, Default)]
pub struct InMemorySequenceRepository {
    state: Arc<RwLock<InMemorySequenceState>>,
}

#[derive(Debug, Default)]
struct InMemorySequenceState {
    sequences: HashMap<SequenceId, Sequence>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
}

impl InMemorySequenceState {
    fn active_enrollment(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> Option<&Enrollment> {
        self.enrollments.values().find(|enrollment| {
            enrollment.sequence_id() == sequence_id
                && enrollment.contact_id() == contact_id
                && enrollment.status() == EnrollmentStatus::Active
        })
    }
}

impl InMemorySequenceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: PoisonError<T>) -> SequenceRepositoryError {
    SequenceRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SequenceRepository for InMemorySequenceRepository {
    async fn store_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.sequences.contains_key(&sequence.id()) {
            return Err(SequenceRepositoryError::DuplicateSequence(sequence.id()));
        }
        state.sequences.insert(sequence.id(), sequence.clone());
        Ok(())
    }

    async fn update_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let existing = state
            .sequences
            .get_mut(&sequence.id())
            .ok_or(SequenceRepositoryError::SequenceNotFound(sequence.id()))?;
        *existing = sequence.clone();
        Ok(())
    }

    async fn find_sequence(&self, id: SequenceId) -> SequenceRepositoryResult<Option<Sequence>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.sequences.get(&id).cloned())
    }

    async fn store_enrollment_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> SequenceRepositoryResult<Enrollment> {
        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(existing) =
            state.active_enrollment(enrollment.sequence_id(), enrollment.contact_id())
        {
            return Ok(existing.clone());
        }
        state.enrollments.insert(enrollment.id(), enrollment.clone());
        Ok(enrollment.clone())
    }

    async fn update_enrollment(&self, enrollment: &Enrollment) -> SequenceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let existing = state
            .enrollments
            .get_mut(&enrollment.id())
            .ok_or(SequenceRepositoryError::EnrollmentNotFound(enrollment.id()))?;
        *existing = enrollment.clone();
        Ok(())
    }

    async fn record_attempt(
        &self,
        id: EnrollmentId,
        attempted_at: DateTime<Utc>,
    ) -> SequenceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let existing = state
            .enrollments
            .get_mut(&id)
            .ok_or(SequenceRepositoryError::EnrollmentNotFound(id))?;
        existing.record_attempt(attempted_at);
        Ok(())
    }

    async fn find_enrollment(
        &self,
        id: EnrollmentId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.enrollments.get(&id).cloned())
    }

    async fn find_active_enrollment(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.active_enrollment(sequence_id, contact_id).cloned())
    }

    async fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut enrollments: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|enrollment| enrollment.sequence_id() == sequence_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(Enrollment::started_at);
        Ok(enrollments)
    }

    async fn find_due_enrollments(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut due: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|enrollment| enrollment.is_due(now))
            .cloned()
            .collect();
        // `None` sorts first, so never-attempted enrollments lead.
        due.sort_by_key(|enrollment| {
            (
                enrollment.last_attempted_at(),
                enrollment.next_step_at(),
                enrollment.started_at(),
            )
        });
        due.truncate(limit);
        Ok(due)
    }
}
