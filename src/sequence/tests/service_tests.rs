//! Service orchestration tests for enrollment and step sweeps.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SequenceConfig;
use crate::outreach::{
    adapters::memory::{InMemoryActivityRecorder, InMemoryEmailQueue},
    domain::{
        ActivityKind, ContactId, ContactProfile, EmailTemplate, EmailTemplateId, OutreachOrigin,
        QueuedEmail, TemplatedEmailRequest,
    },
    ports::{EmailQueue, EmailQueueError, EmailQueueResult},
};
use crate::sequence::{
    adapters::memory::InMemorySequenceRepository,
    domain::{
        CompletionReason, Enrollment, EnrollmentId, EnrollmentStatus, PersistedSequenceData,
        Sequence, SequenceDomainError, SequenceId, SequenceName, SequenceStep, StepOutcome,
    },
    ports::{SequenceRepository, SequenceRepositoryError, SequenceRepositoryResult},
    services::{CreateSequenceRequest, SequenceService, SequenceServiceError},
};
use crate::test_support::ManualClock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use mockall::mock;
use rstest::{fixture, rstest};

type TestService = SequenceService<
    InMemorySequenceRepository,
    InMemoryEmailQueue,
    InMemoryActivityRecorder,
    ManualClock,
>;

struct TestContext {
    queue: Arc<InMemoryEmailQueue>,
    activities: Arc<InMemoryActivityRecorder>,
    repository: Arc<InMemorySequenceRepository>,
    clock: Arc<ManualClock>,
    template_id: EmailTemplateId,
    service: TestService,
}

impl TestContext {
    fn add_contact(&self, first_name: &str) -> ContactId {
        let contact = ContactProfile::new(ContactId::new())
            .with_first_name(first_name)
            .with_email(format!("{}@example.com", first_name.to_ascii_lowercase()));
        let contact_id = contact.id();
        self.queue.add_contact(contact).expect("contact stored");
        contact_id
    }

    fn with_config(self, config: SequenceConfig) -> Self {
        let service = SequenceService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.queue),
            Arc::clone(&self.activities),
            Arc::clone(&self.clock),
        )
        .with_config(config);
        Self { service, ..self }
    }
}

#[fixture]
fn context() -> TestContext {
    let queue = Arc::new(InMemoryEmailQueue::new());
    let template = EmailTemplate::new("Intro", "Hi {{ first_name }}", "Welcome aboard")
        .expect("valid template");
    let template_id = template.id();
    queue.add_template(template).expect("template stored");
    let activities = Arc::new(InMemoryActivityRecorder::new());
    let repository = Arc::new(InMemorySequenceRepository::new());
    let clock = Arc::new(ManualClock::monday_morning());
    let service = SequenceService::new(
        Arc::clone(&repository),
        Arc::clone(&queue),
        Arc::clone(&activities),
        Arc::clone(&clock),
    );
    TestContext {
        queue,
        activities,
        repository,
        clock,
        template_id,
        service,
    }
}

/// Stores a sequence without step validation, as a row loaded from storage would be.
async fn store_unchecked_sequence(context: &TestContext, steps: Vec<SequenceStep>) -> SequenceId {
    let now = context.clock.utc();
    let sequence = Sequence::from_persisted(PersistedSequenceData {
        id: SequenceId::new(),
        name: SequenceName::new("Imported").expect("valid name"),
        steps,
        is_active: true,
        created_at: now,
        updated_at: now,
    });
    context
        .repository
        .store_sequence(&sequence)
        .await
        .expect("sequence should be stored");
    sequence.id()
}

async fn create_sequence(context: &TestContext, steps: Vec<SequenceStep>) -> SequenceId {
    context
        .service
        .create_sequence(CreateSequenceRequest::new("Onboarding", steps))
        .await
        .expect("sequence should be created")
        .id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enrolling_twice_returns_the_same_enrollment(context: TestContext) {
    let sequence_id = create_sequence(&context, vec![SequenceStep::wait(1)]).await;
    let contact_id = context.add_contact("Ada");

    let first = context
        .service
        .enroll_contact(sequence_id, contact_id)
        .await
        .expect("first enrollment should succeed");
    let second = context
        .service
        .enroll_contact(sequence_id, contact_id)
        .await
        .expect("second enrollment should succeed");

    assert_eq!(first.id(), second.id());
    let enrollments = context
        .service
        .list_enrollments(sequence_id)
        .await
        .expect("listing should succeed");
    assert_eq!(enrollments.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_step_is_due_after_its_delay(context: TestContext) {
    let sequence_id = create_sequence(&context, vec![SequenceStep::wait(2)]).await;

    let enrollment = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");

    assert_eq!(enrollment.current_step(), 0);
    assert_eq!(enrollment.status(), EnrollmentStatus::Active);
    assert_eq!(
        enrollment.next_step_at(),
        Some(context.clock.utc() + Duration::days(2))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enrolling_in_unknown_sequence_fails(context: TestContext) {
    let missing = SequenceId::new();

    let result = context.service.enroll_contact(missing, ContactId::new()).await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::SequenceNotFound(id)) if id == missing
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enrolling_in_inactive_sequence_fails(context: TestContext) {
    let sequence_id = create_sequence(&context, vec![SequenceStep::wait(1)]).await;
    context
        .service
        .deactivate_sequence(sequence_id)
        .await
        .expect("deactivation should succeed");

    let result = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::Domain(SequenceDomainError::SequenceInactive(id))) if id == sequence_id
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn single_step_sequence_completes_after_one_sweep(context: TestContext) {
    let template_id = context.template_id;
    let sequence_id =
        create_sequence(&context, vec![SequenceStep::email(0, template_id)]).await;
    let contact_id = context.add_contact("Ada");
    let enrollment = context
        .service
        .enroll_contact(sequence_id, contact_id)
        .await
        .expect("enrollment should succeed");

    let results = context
        .service
        .process_due_steps()
        .await
        .expect("sweep should succeed");

    assert_eq!(results.len(), 1);
    let queued = context.queue.queued().expect("queue readable");
    assert_eq!(queued.len(), 1);
    let email = queued.first().expect("one email queued");
    assert_eq!(email.subject(), "Hi Ada");
    assert_eq!(
        email.origin(),
        Some(&OutreachOrigin::SequenceStep {
            sequence_id: sequence_id.into_inner(),
            enrollment_id: enrollment.id().into_inner(),
            step_index: 0,
        })
    );
    assert_eq!(
        results.first().map(|result| &result.outcome),
        Some(&StepOutcome::EmailQueued {
            email_id: email.id()
        })
    );

    let stored = context
        .service
        .find_enrollment(enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(stored.status(), EnrollmentStatus::Completed);
    assert_eq!(stored.current_step(), 1);
    assert_eq!(stored.completed_at(), Some(context.clock.utc()));
    assert_eq!(results.first().map(|result| result.completed), Some(true));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn steps_run_only_when_due(context: TestContext) {
    let sequence_id = create_sequence(
        &context,
        vec![SequenceStep::wait(0), SequenceStep::task(2, "Call the contact")],
    )
    .await;
    let contact_id = context.add_contact("Grace");
    context
        .service
        .enroll_contact(sequence_id, contact_id)
        .await
        .expect("enrollment should succeed");

    let first = context.service.process_due_steps().await.expect("sweep");
    let idle = context.service.process_due_steps().await.expect("sweep");
    context.clock.advance(Duration::days(2));
    let second = context.service.process_due_steps().await.expect("sweep");

    assert_eq!(
        first.iter().map(|result| result.outcome.status()).collect::<Vec<_>>(),
        vec!["waited"]
    );
    assert!(first.iter().all(|result| !result.completed));
    assert!(idle.is_empty());
    assert!(second.iter().all(|result| result.completed));
    assert_eq!(
        second.iter().map(|result| result.outcome.status()).collect::<Vec<_>>(),
        vec!["task_created"]
    );
    let activities = context
        .activities
        .for_contact(contact_id)
        .expect("activities readable");
    assert_eq!(activities.len(), 1);
    let activity = activities.first().expect("one activity");
    assert_eq!(activity.kind(), ActivityKind::Task);
    assert_eq!(activity.description(), "Call the contact");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_sequence_completes_with_no_steps(context: TestContext) {
    let sequence_id = create_sequence(&context, Vec::new()).await;
    let enrollment = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");
    assert_eq!(enrollment.next_step_at(), Some(context.clock.utc()));

    let results = context.service.process_due_steps().await.expect("sweep");

    assert_eq!(
        results.first().map(|result| &result.outcome),
        Some(&StepOutcome::Completed {
            reason: CompletionReason::NoSteps
        })
    );
    let stored = context
        .service
        .find_enrollment(enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(stored.status(), EnrollmentStatus::Completed);
    assert_eq!(stored.current_step(), 0);
    assert_eq!(results.first().map(|result| result.completed), Some(true));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_step_keeps_step_cursor(context: TestContext) {
    let template_id = context.template_id;
    let sequence_id = create_sequence(
        &context,
        vec![SequenceStep::email(0, template_id), SequenceStep::wait(1)],
    )
    .await;
    let healthy = context.add_contact("Ada");
    let broken = context.add_contact("Bob");
    context.queue.reject_contact(broken).expect("rejection stored");
    let healthy_enrollment = context
        .service
        .enroll_contact(sequence_id, healthy)
        .await
        .expect("enrollment should succeed");
    let broken_enrollment = context
        .service
        .enroll_contact(sequence_id, broken)
        .await
        .expect("enrollment should succeed");

    let results = context.service.process_due_steps().await.expect("sweep");

    assert_eq!(results.len(), 2);
    let broken_result = results
        .iter()
        .find(|result| result.enrollment_id == broken_enrollment.id())
        .expect("broken enrollment reported");
    assert!(broken_result.outcome.is_error());
    assert_eq!(broken_result.outcome.status(), "error");
    assert!(!broken_result.completed);

    let unchanged = context
        .service
        .find_enrollment(broken_enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(unchanged.current_step(), broken_enrollment.current_step());
    assert_eq!(unchanged.status(), EnrollmentStatus::Active);
    assert_eq!(unchanged.next_step_at(), broken_enrollment.next_step_at());
    assert_eq!(unchanged.last_attempted_at(), Some(context.clock.utc()));

    let advanced = context
        .service
        .find_enrollment(healthy_enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(advanced.current_step(), 1);
    assert_eq!(
        advanced.next_step_at(),
        Some(context.clock.utc() + Duration::days(1))
    );
}

mock! {
    UnavailableQueue {}

    #[async_trait]
    impl EmailQueue for UnavailableQueue {
        async fn queue_templated(
            &self,
            request: &TemplatedEmailRequest,
            queued_at: DateTime<Utc>,
        ) -> EmailQueueResult<QueuedEmail>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queue_outage_is_reported_per_enrollment() {
    let mut queue = MockUnavailableQueue::new();
    queue.expect_queue_templated().times(2).returning(|_, _| {
        Err(EmailQueueError::persistence(std::io::Error::other(
            "smtp relay unavailable",
        )))
    });
    let repository = Arc::new(InMemorySequenceRepository::new());
    let clock = Arc::new(ManualClock::monday_morning());
    let service = SequenceService::new(
        Arc::clone(&repository),
        Arc::new(queue),
        Arc::new(InMemoryActivityRecorder::new()),
        Arc::clone(&clock),
    );
    let sequence = service
        .create_sequence(CreateSequenceRequest::new(
            "Outage",
            vec![SequenceStep::email(0, EmailTemplateId::new())],
        ))
        .await
        .expect("sequence should be created");
    for _ in 0..2 {
        service
            .enroll_contact(sequence.id(), ContactId::new())
            .await
            .expect("enrollment should succeed");
    }

    let results = service.process_due_steps().await.expect("sweep");

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result.outcome.is_error()));
    let enrollments = service
        .list_enrollments(sequence.id())
        .await
        .expect("listing should succeed");
    assert!(enrollments.iter().all(|enrollment| enrollment.current_step() == 0
        && enrollment.status() == EnrollmentStatus::Active));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anchored_policy_schedules_from_start(context: TestContext) {
    let anchored = context.with_config(SequenceConfig::anchored());
    let sequence_id = create_sequence(
        &anchored,
        vec![SequenceStep::wait(1), SequenceStep::wait(2), SequenceStep::wait(3)],
    )
    .await;
    let enrollment = anchored
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");
    let started = enrollment.started_at();

    // Sweep runs a day late; the next step keeps its original slot.
    anchored.clock.advance(Duration::days(2));
    anchored.service.process_due_steps().await.expect("sweep");

    let stored = anchored
        .service
        .find_enrollment(enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(stored.current_step(), 1);
    assert_eq!(stored.next_step_at(), Some(started + Duration::days(3)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_limit_takes_oldest_due_first(context: TestContext) {
    let limit = NonZeroUsize::new(1).expect("non-zero");
    let limited = context.with_config(SequenceConfig::default().with_batch_limit(limit));
    let sequence_id = create_sequence(&limited, vec![SequenceStep::wait(0)]).await;
    let older = limited
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");
    limited.clock.advance(Duration::hours(1));
    limited
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");

    let first = limited.service.process_due_steps().await.expect("sweep");
    let second = limited.service.process_due_steps().await.expect("sweep");

    assert_eq!(
        first.iter().map(|result| result.enrollment_id).collect::<Vec<_>>(),
        vec![older.id()]
    );
    assert_eq!(second.len(), 1);
    assert_ne!(second.first().map(|result| result.enrollment_id), Some(older.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pause_and_resume_round_trip(context: TestContext) {
    let sequence_id = create_sequence(&context, vec![SequenceStep::wait(5)]).await;
    let enrollment = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");

    let paused = context
        .service
        .pause_enrollment(enrollment.id())
        .await
        .expect("pause should succeed");
    assert_eq!(paused.status(), EnrollmentStatus::Paused);
    context.clock.advance(Duration::days(10));
    assert!(context.service.process_due_steps().await.expect("sweep").is_empty());

    let resumed = context
        .service
        .resume_enrollment(enrollment.id())
        .await
        .expect("resume should succeed");

    assert_eq!(resumed.status(), EnrollmentStatus::Active);
    assert!(resumed.next_step_at().is_some_and(|due| due <= context.clock.utc()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resuming_active_enrollment_is_rejected(context: TestContext) {
    let sequence_id = create_sequence(&context, vec![SequenceStep::wait(1)]).await;
    let enrollment = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await
        .expect("enrollment should succeed");

    let result = context.service.resume_enrollment(enrollment.id()).await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::Domain(
            SequenceDomainError::InvalidStateTransition { .. }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_sequence_name_is_rejected(context: TestContext) {
    let result = context
        .service
        .create_sequence(CreateSequenceRequest::new("   ", vec![SequenceStep::wait(1)]))
        .await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::Domain(SequenceDomainError::EmptySequenceName))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_head_enrollment_does_not_starve_the_batch(context: TestContext) {
    let limit = NonZeroUsize::new(1).expect("non-zero");
    let limited = context.with_config(SequenceConfig::default().with_batch_limit(limit));
    let template_id = limited.template_id;
    let sequence_id = create_sequence(
        &limited,
        vec![SequenceStep::email(0, template_id), SequenceStep::wait(1)],
    )
    .await;
    let broken = limited.add_contact("Bob");
    limited.queue.reject_contact(broken).expect("rejection stored");
    let healthy = limited.add_contact("Ada");
    let broken_enrollment = limited
        .service
        .enroll_contact(sequence_id, broken)
        .await
        .expect("enrollment should succeed");
    limited.clock.advance(Duration::hours(1));
    let healthy_enrollment = limited
        .service
        .enroll_contact(sequence_id, healthy)
        .await
        .expect("enrollment should succeed");

    let first = limited.service.process_due_steps().await.expect("sweep");
    let second = limited.service.process_due_steps().await.expect("sweep");

    assert_eq!(
        first.iter().map(|result| result.enrollment_id).collect::<Vec<_>>(),
        vec![broken_enrollment.id()]
    );
    assert!(first.iter().all(|result| result.outcome.is_error()));
    assert_eq!(
        second.iter().map(|result| result.enrollment_id).collect::<Vec<_>>(),
        vec![healthy_enrollment.id()]
    );
    let advanced = limited
        .service
        .find_enrollment(healthy_enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(advanced.current_step(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_due_time_fails_only_its_enrollment(context: TestContext) {
    let overflowing = store_unchecked_sequence(
        &context,
        vec![SequenceStep::wait(0), SequenceStep::wait(u32::MAX)],
    )
    .await;
    let healthy =
        create_sequence(&context, vec![SequenceStep::wait(0), SequenceStep::wait(1)]).await;
    let stuck = context
        .service
        .enroll_contact(overflowing, ContactId::new())
        .await
        .expect("enrollment should succeed");
    let moving = context
        .service
        .enroll_contact(healthy, ContactId::new())
        .await
        .expect("enrollment should succeed");

    let results = context.service.process_due_steps().await.expect("sweep");

    assert_eq!(results.len(), 2);
    let stuck_result = results
        .iter()
        .find(|result| result.enrollment_id == stuck.id())
        .expect("overflowing enrollment reported");
    assert_eq!(
        stuck_result.outcome,
        StepOutcome::Error {
            message: SequenceDomainError::ScheduleOverflow { index: 1 }.to_string(),
        }
    );
    let moving_result = results
        .iter()
        .find(|result| result.enrollment_id == moving.id())
        .expect("healthy enrollment reported");
    assert_eq!(moving_result.outcome, StepOutcome::Waited);

    let stored = context
        .service
        .find_enrollment(stuck.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(stored.current_step(), 0);
    assert_eq!(stored.status(), EnrollmentStatus::Active);
    let advanced = context
        .service
        .find_enrollment(moving.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(advanced.current_step(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_first_step_rejects_enrollment(context: TestContext) {
    let sequence_id = store_unchecked_sequence(&context, vec![SequenceStep::wait(u32::MAX)]).await;

    let result = context
        .service
        .enroll_contact(sequence_id, ContactId::new())
        .await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::Domain(SequenceDomainError::ScheduleOverflow { index: 0 }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlong_delay_is_rejected_at_creation(context: TestContext) {
    let result = context
        .service
        .create_sequence(CreateSequenceRequest::new(
            "Glacial",
            vec![SequenceStep::wait(SequenceStep::MAX_DELAY_DAYS + 1)],
        ))
        .await;

    assert!(matches!(
        result,
        Err(SequenceServiceError::Domain(SequenceDomainError::StepDelayTooLong { index: 0, .. }))
    ));
}

/// Delegates to the in-memory repository but fails the first enrollment update.
struct FlakyUpdates {
    inner: Arc<InMemorySequenceRepository>,
    failed_once: AtomicBool,
}

#[async_trait]
impl SequenceRepository for FlakyUpdates {
    async fn store_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        self.inner.store_sequence(sequence).await
    }

    async fn update_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        self.inner.update_sequence(sequence).await
    }

    async fn find_sequence(&self, id: SequenceId) -> SequenceRepositoryResult<Option<Sequence>> {
        self.inner.find_sequence(id).await
    }

    async fn store_enrollment_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> SequenceRepositoryResult<Enrollment> {
        self.inner.store_enrollment_if_absent(enrollment).await
    }

    async fn update_enrollment(&self, enrollment: &Enrollment) -> SequenceRepositoryResult<()> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(SequenceRepositoryError::persistence(std::io::Error::other(
                "connection reset",
            )));
        }
        self.inner.update_enrollment(enrollment).await
    }

    async fn record_attempt(
        &self,
        id: EnrollmentId,
        attempted_at: DateTime<Utc>,
    ) -> SequenceRepositoryResult<()> {
        self.inner.record_attempt(id, attempted_at).await
    }

    async fn find_enrollment(
        &self,
        id: EnrollmentId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        self.inner.find_enrollment(id).await
    }

    async fn find_active_enrollment(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        self.inner.find_active_enrollment(sequence_id, contact_id).await
    }

    async fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        self.inner.list_enrollments(sequence_id).await
    }

    async fn find_due_enrollments(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        self.inner.find_due_enrollments(now, limit).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lost_update_redelivers_step_with_same_origin(context: TestContext) {
    let repository = Arc::new(FlakyUpdates {
        inner: Arc::clone(&context.repository),
        failed_once: AtomicBool::new(false),
    });
    let service = SequenceService::new(
        repository,
        Arc::clone(&context.queue),
        Arc::clone(&context.activities),
        Arc::clone(&context.clock),
    );
    let sequence = service
        .create_sequence(CreateSequenceRequest::new(
            "Retry",
            vec![SequenceStep::email(0, context.template_id), SequenceStep::wait(1)],
        ))
        .await
        .expect("sequence should be created");
    let contact_id = context.add_contact("Ada");
    let enrollment = service
        .enroll_contact(sequence.id(), contact_id)
        .await
        .expect("enrollment should succeed");

    let first = service.process_due_steps().await.expect("sweep");
    let second = service.process_due_steps().await.expect("sweep");

    assert!(first.iter().all(|result| result.outcome.is_error()));
    assert_eq!(
        second.iter().map(|result| result.outcome.status()).collect::<Vec<_>>(),
        vec!["email_queued"]
    );
    let queued = context.queue.queued().expect("queue readable");
    let expected_origin = OutreachOrigin::SequenceStep {
        sequence_id: sequence.id().into_inner(),
        enrollment_id: enrollment.id().into_inner(),
        step_index: 0,
    };
    assert_eq!(queued.len(), 2);
    assert!(queued.iter().all(|email| email.origin() == Some(&expected_origin)));
    let stored = service
        .find_enrollment(enrollment.id())
        .await
        .expect("lookup should succeed")
        .expect("enrollment should exist");
    assert_eq!(stored.current_step(), 1);
}
