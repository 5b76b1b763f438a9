//! In-memory integration tests for sales sequence sweeps.

use std::sync::Arc;

use chrono::Utc;
use crm_engine::outreach::{
    adapters::memory::{InMemoryActivityRecorder, InMemoryEmailQueue},
    domain::{ContactId, ContactProfile, EmailTemplate},
};
use crm_engine::sequence::{
    adapters::memory::InMemorySequenceRepository,
    domain::{EnrollmentStatus, SequenceStep, StepOutcome},
    services::{CreateSequenceRequest, SequenceService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = SequenceService<
    InMemorySequenceRepository,
    InMemoryEmailQueue,
    InMemoryActivityRecorder,
    DefaultClock,
>;

struct Harness {
    queue: Arc<InMemoryEmailQueue>,
    activities: Arc<InMemoryActivityRecorder>,
    service: TestService,
}

#[fixture]
fn harness() -> Harness {
    let queue = Arc::new(InMemoryEmailQueue::new());
    let activities = Arc::new(InMemoryActivityRecorder::new());
    let service = SequenceService::new(
        Arc::new(InMemorySequenceRepository::new()),
        Arc::clone(&queue),
        Arc::clone(&activities),
        Arc::new(DefaultClock),
    );
    Harness {
        queue,
        activities,
        service,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn immediate_email_step_runs_and_schedules_the_next_step(
    harness: Harness,
) -> eyre::Result<()> {
    let template = EmailTemplate::new(
        "Welcome",
        "Hello {{ first_name }}",
        "Thanks for your interest in {{ company }}.",
    )?;
    let template_id = template.id();
    harness.queue.add_template(template)?;
    let contact = ContactProfile::new(ContactId::new())
        .with_first_name("Ada")
        .with_company("Analytical Engines")
        .with_email("ada@example.com");
    let contact_id = contact.id();
    harness.queue.add_contact(contact)?;

    let sequence = harness
        .service
        .create_sequence(CreateSequenceRequest::new(
            "Welcome series",
            [
                SequenceStep::email(0, template_id),
                SequenceStep::task(3, "Call to follow up"),
            ],
        ))
        .await?;
    let enrollment = harness
        .service
        .enroll_contact(sequence.id(), contact_id)
        .await?;

    let first_sweep = harness.service.process_due_steps().await?;
    let second_sweep = harness.service.process_due_steps().await?;

    eyre::ensure!(first_sweep.len() == 1, "expected one due enrollment");
    eyre::ensure!(
        first_sweep
            .iter()
            .all(|result| matches!(result.outcome, StepOutcome::EmailQueued { .. })),
        "expected an email to be queued, got {first_sweep:?}"
    );
    eyre::ensure!(second_sweep.is_empty(), "task step should not be due yet");

    let queued = harness.queue.queued()?;
    let [email] = queued.as_slice() else {
        eyre::bail!("expected one queued email, got {}", queued.len());
    };
    eyre::ensure!(email.subject() == "Hello Ada");
    eyre::ensure!(email.recipient() == "ada@example.com");

    let advanced = harness
        .service
        .find_enrollment(enrollment.id())
        .await?
        .ok_or_else(|| eyre::eyre!("enrollment should exist"))?;
    eyre::ensure!(advanced.status() == EnrollmentStatus::Active);
    eyre::ensure!(advanced.current_step() == 1);
    eyre::ensure!(advanced.next_step_at().is_some_and(|due| due > Utc::now()));
    eyre::ensure!(harness.activities.all()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn immediate_task_step_creates_a_follow_up_and_completes(
    harness: Harness,
) -> eyre::Result<()> {
    let contact_id = ContactId::new();
    let sequence = harness
        .service
        .create_sequence(CreateSequenceRequest::new(
            "Call list",
            [SequenceStep::task(0, "Introductory call")],
        ))
        .await?;
    let enrollment = harness
        .service
        .enroll_contact(sequence.id(), contact_id)
        .await?;

    let results = harness.service.process_due_steps().await?;

    eyre::ensure!(
        results
            .iter()
            .all(|result| matches!(result.outcome, StepOutcome::TaskCreated { .. })),
        "expected a follow-up task, got {results:?}"
    );
    let follow_ups = harness.activities.for_contact(contact_id)?;
    eyre::ensure!(follow_ups.len() == 1);
    let completed = harness
        .service
        .find_enrollment(enrollment.id())
        .await?
        .ok_or_else(|| eyre::eyre!("enrollment should exist"))?;
    eyre::ensure!(completed.status() == EnrollmentStatus::Completed);
    eyre::ensure!(completed.completed_at().is_some());
    Ok(())
}
