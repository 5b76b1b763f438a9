//! Service layer for sequence enrollment and step execution.

use crate::config::SequenceConfig;
use crate::outreach::{
    domain::{ContactId, FollowUpTask, OutreachDomainError, OutreachOrigin, TemplatedEmailRequest},
    ports::{ActivityRecorder, ActivityRecorderError, EmailQueue, EmailQueueError},
};
use crate::sequence::{
    domain::{
        CompletionReason, Enrollment, EnrollmentId, EnrollmentStatus, Sequence,
        SequenceDomainError, SequenceId, SequenceName, SequenceStep, StepOutcome, StepResult,
    },
    ports::{SequenceRepository, SequenceRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSequenceRequest {
    name: String,
    steps: Vec<SequenceStep>,
}

impl CreateSequenceRequest {
    /// Creates a request with the given steps in execution order.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = SequenceStep>) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().collect(),
        }
    }
}

/// Service-level errors for sequence operations.
#[derive(Debug, Error)]
pub enum SequenceServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] SequenceDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] SequenceRepositoryError),
    /// No sequence exists with the given identifier.
    #[error("sequence {0} not found")]
    SequenceNotFound(SequenceId),
    /// No enrollment exists with the given identifier.
    #[error("enrollment {0} not found")]
    EnrollmentNotFound(EnrollmentId),
}

/// Result type for sequence service operations.
pub type SequenceServiceResult<T> = Result<T, SequenceServiceError>;

/// Failure while running one enrollment's step. Reported, never propagated.
#[derive(Debug, Error)]
enum StepFailure {
    #[error(transparent)]
    EmailQueue(#[from] EmailQueueError),
    #[error(transparent)]
    Activity(#[from] ActivityRecorderError),
    #[error(transparent)]
    Outreach(#[from] OutreachDomainError),
    #[error(transparent)]
    Domain(#[from] SequenceDomainError),
    #[error(transparent)]
    Repository(#[from] SequenceRepositoryError),
    #[error("sequence {0} not found")]
    SequenceMissing(SequenceId),
}

/// Sequence orchestration service.
#[derive(Clone)]
pub struct SequenceService<R, E, A, C>
where
    R: SequenceRepository,
    E: EmailQueue,
    A: ActivityRecorder,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    email_queue: Arc<E>,
    activities: Arc<A>,
    clock: Arc<C>,
    config: SequenceConfig,
}

impl<R, E, A, C> SequenceService<R, E, A, C>
where
    R: SequenceRepository,
    E: EmailQueue,
    A: ActivityRecorder,
    C: Clock + Send + Sync,
{
    /// Creates a new sequence service with default settings.
    #[must_use]
    pub fn new(repository: Arc<R>, email_queue: Arc<E>, activities: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            email_queue,
            activities,
            clock,
            config: SequenceConfig::default(),
        }
    }

    /// Replaces the sweep settings.
    #[must_use]
    pub const fn with_config(mut self, config: SequenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates and persists a new active sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::Domain`] when the name or a step is
    /// invalid, or repository errors.
    pub async fn create_sequence(
        &self,
        request: CreateSequenceRequest,
    ) -> SequenceServiceResult<Sequence> {
        let name = SequenceName::new(request.name)?;
        let sequence = Sequence::new(name, request.steps, &*self.clock)?;
        self.repository.store_sequence(&sequence).await?;
        info!(
            sequence_id = %sequence.id(),
            steps = sequence.steps().len(),
            "sequence created"
        );
        Ok(sequence)
    }

    /// Finds a sequence by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::Repository`] when lookup fails.
    pub async fn find_sequence(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceServiceResult<Option<Sequence>> {
        Ok(self.repository.find_sequence(sequence_id).await?)
    }

    /// Stops a sequence from accepting new enrollments.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::SequenceNotFound`] when the sequence
    /// does not exist, or repository errors.
    pub async fn deactivate_sequence(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceServiceResult<Sequence> {
        let mut sequence = self.sequence_or_error(sequence_id).await?;
        sequence.deactivate(&*self.clock);
        self.repository.update_sequence(&sequence).await?;
        Ok(sequence)
    }

    /// Lets a sequence accept new enrollments again.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::SequenceNotFound`] when the sequence
    /// does not exist, or repository errors.
    pub async fn activate_sequence(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceServiceResult<Sequence> {
        let mut sequence = self.sequence_or_error(sequence_id).await?;
        sequence.activate(&*self.clock);
        self.repository.update_sequence(&sequence).await?;
        Ok(sequence)
    }

    /// Enrolls a contact in a sequence.
    ///
    /// Returns the existing enrollment when the contact is already actively
    /// enrolled. Otherwise the first step falls due after its own delay, or
    /// immediately when the sequence has no steps.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::SequenceNotFound`] for an unknown
    /// sequence, [`SequenceDomainError::SequenceInactive`] for an inactive
    /// one, [`SequenceDomainError::ScheduleOverflow`] when the first due time
    /// is out of range, or repository errors.
    pub async fn enroll_contact(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> SequenceServiceResult<Enrollment> {
        let sequence = self.sequence_or_error(sequence_id).await?;
        if !sequence.is_active() {
            return Err(SequenceDomainError::SequenceInactive(sequence_id).into());
        }

        if let Some(existing) = self
            .repository
            .find_active_enrollment(sequence_id, contact_id)
            .await?
        {
            debug!(
                enrollment_id = %existing.id(),
                sequence_id = %sequence_id,
                contact_id = %contact_id,
                "contact already enrolled"
            );
            return Ok(existing);
        }

        let now = self.clock.utc();
        let first_due = self
            .config
            .schedule_policy
            .next_due_at(sequence.steps(), 0, now, now)?
            .unwrap_or(now);
        let candidate = Enrollment::new(sequence_id, contact_id, first_due, &*self.clock);
        let enrollment = self
            .repository
            .store_enrollment_if_absent(&candidate)
            .await?;
        info!(
            enrollment_id = %enrollment.id(),
            sequence_id = %sequence_id,
            contact_id = %contact_id,
            next_step_at = ?enrollment.next_step_at(),
            "contact enrolled"
        );
        Ok(enrollment)
    }

    /// Runs every active enrollment whose next step is due.
    ///
    /// At most the configured batch limit is handled per call. Every
    /// enrollment picked up has its attempt time stamped, and selection
    /// favours the least recently attempted, so failing enrollments rotate to
    /// the back instead of filling every batch. A failing enrollment is
    /// reported with an error outcome and keeps its step cursor; the sweep
    /// carries on with the rest.
    ///
    /// Delivery is at least once. When an email or task is handed off but the
    /// enrollment update then fails, the next sweep runs the same step again.
    /// Its [`OutreachOrigin::SequenceStep`] is identical on both runs, so
    /// downstream consumers can deduplicate on it.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::Repository`] only when the due
    /// enrollments cannot be listed.
    pub async fn process_due_steps(&self) -> SequenceServiceResult<Vec<StepResult>> {
        let now = self.clock.utc();
        let due = self
            .repository
            .find_due_enrollments(now, self.config.batch_limit.get())
            .await?;
        debug!(count = due.len(), "processing due enrollments");

        let mut sequences: HashMap<SequenceId, Sequence> = HashMap::new();
        let mut results = Vec::with_capacity(due.len());
        for enrollment in due {
            let enrollment_id = enrollment.id();
            let sequence_id = enrollment.sequence_id();
            let contact_id = enrollment.contact_id();
            let step_index = enrollment.current_step();

            let (outcome, completed) = match self.run_step(enrollment, &mut sequences, now).await {
                Ok(ran) => ran,
                Err(failure) => {
                    warn!(
                        enrollment_id = %enrollment_id,
                        sequence_id = %sequence_id,
                        step_index,
                        error = %failure,
                        "sequence step failed"
                    );
                    if let Err(err) = self.repository.record_attempt(enrollment_id, now).await {
                        warn!(
                            enrollment_id = %enrollment_id,
                            error = %err,
                            "failed to record sequence step attempt"
                        );
                    }
                    let outcome = StepOutcome::Error {
                        message: failure.to_string(),
                    };
                    (outcome, false)
                }
            };
            results.push(StepResult {
                enrollment_id,
                sequence_id,
                contact_id,
                step_index,
                outcome,
                completed,
            });
        }

        let failed = results.iter().filter(|result| result.outcome.is_error()).count();
        let completed = results.iter().filter(|result| result.completed).count();
        info!(
            processed = results.len(),
            failed,
            completed,
            "sequence sweep finished"
        );
        Ok(results)
    }

    /// Runs the enrollment's current step and reports whether it completed.
    async fn run_step(
        &self,
        mut enrollment: Enrollment,
        sequences: &mut HashMap<SequenceId, Sequence>,
        now: DateTime<Utc>,
    ) -> Result<(StepOutcome, bool), StepFailure> {
        let sequence_id = enrollment.sequence_id();
        if !sequences.contains_key(&sequence_id) {
            let loaded = self
                .repository
                .find_sequence(sequence_id)
                .await?
                .ok_or(StepFailure::SequenceMissing(sequence_id))?;
            sequences.insert(sequence_id, loaded);
        }
        let sequence = sequences
            .get(&sequence_id)
            .ok_or(StepFailure::SequenceMissing(sequence_id))?;

        let index = enrollment.current_step();
        let Some(step) = sequence.step(index) else {
            let reason = if sequence.steps().is_empty() {
                CompletionReason::NoSteps
            } else {
                CompletionReason::AllStepsDone
            };
            enrollment.complete(&*self.clock)?;
            enrollment.record_attempt(now);
            self.repository.update_enrollment(&enrollment).await?;
            info!(
                enrollment_id = %enrollment.id(),
                reason = reason.as_str(),
                "enrollment completed"
            );
            return Ok((StepOutcome::Completed { reason }, true));
        };

        let origin = OutreachOrigin::SequenceStep {
            sequence_id: sequence_id.into_inner(),
            enrollment_id: enrollment.id().into_inner(),
            step_index: index,
        };
        let outcome = match step {
            SequenceStep::Email { template_id, .. } => {
                let request = TemplatedEmailRequest::new(enrollment.contact_id(), *template_id)
                    .with_origin(origin);
                let email = self.email_queue.queue_templated(&request, now).await?;
                StepOutcome::EmailQueued {
                    email_id: email.id(),
                }
            }
            SequenceStep::Task { description, .. } => {
                let task = FollowUpTask::new(enrollment.contact_id(), description.as_str(), now)?
                    .with_origin(origin);
                let activity = self.activities.create_follow_up(&task, now).await?;
                StepOutcome::TaskCreated {
                    activity_id: activity.id(),
                }
            }
            SequenceStep::Wait { .. } => StepOutcome::Waited,
        };

        let next_due = self.config.schedule_policy.next_due_at(
            sequence.steps(),
            index.saturating_add(1),
            enrollment.started_at(),
            now,
        )?;
        enrollment.advance(next_due, &*self.clock)?;
        enrollment.record_attempt(now);
        self.repository.update_enrollment(&enrollment).await?;
        debug!(
            enrollment_id = %enrollment.id(),
            step_index = index,
            step = step.kind(),
            status = %enrollment.status(),
            "sequence step executed"
        );
        let completed = enrollment.status() == EnrollmentStatus::Completed;
        Ok((outcome, completed))
    }

    /// Holds an active enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::EnrollmentNotFound`] for an unknown
    /// enrollment, [`SequenceDomainError::InvalidStateTransition`] unless it
    /// is active, or repository errors.
    pub async fn pause_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> SequenceServiceResult<Enrollment> {
        let mut enrollment = self.enrollment_or_error(enrollment_id).await?;
        enrollment.pause(&*self.clock)?;
        self.repository.update_enrollment(&enrollment).await?;
        info!(enrollment_id = %enrollment_id, "enrollment paused");
        Ok(enrollment)
    }

    /// Resumes a paused enrollment; its next step becomes due immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::EnrollmentNotFound`] for an unknown
    /// enrollment, [`SequenceDomainError::InvalidStateTransition`] unless it
    /// is paused, or repository errors.
    pub async fn resume_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> SequenceServiceResult<Enrollment> {
        let mut enrollment = self.enrollment_or_error(enrollment_id).await?;
        enrollment.resume(&*self.clock)?;
        self.repository.update_enrollment(&enrollment).await?;
        info!(enrollment_id = %enrollment_id, "enrollment resumed");
        Ok(enrollment)
    }

    /// Finds an enrollment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::Repository`] when lookup fails.
    pub async fn find_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> SequenceServiceResult<Option<Enrollment>> {
        Ok(self.repository.find_enrollment(enrollment_id).await?)
    }

    /// Lists every enrollment of a sequence in start order.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceServiceError::Repository`] when lookup fails.
    pub async fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceServiceResult<Vec<Enrollment>> {
        Ok(self.repository.list_enrollments(sequence_id).await?)
    }

    async fn sequence_or_error(&self, sequence_id: SequenceId) -> SequenceServiceResult<Sequence> {
        self.repository
            .find_sequence(sequence_id)
            .await?
            .ok_or(SequenceServiceError::SequenceNotFound(sequence_id))
    }

    async fn enrollment_or_error(
        &self,
        enrollment_id: EnrollmentId,
    ) -> SequenceServiceResult<Enrollment> {
        self.repository
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(SequenceServiceError::EnrollmentNotFound(enrollment_id))
    }
}
