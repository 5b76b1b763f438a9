//! Then steps for sequence enrollment BDD scenarios.

use super::world::SequenceWorld;
use crm_engine::sequence::{
    domain::{EnrollmentStatus, SequenceDomainError},
    services::SequenceServiceError,
};
use rstest_bdd_macros::then;

#[then("both enrollment requests return the same enrollment")]
fn same_enrollment_returned(world: &SequenceWorld) -> Result<(), eyre::Report> {
    let [first, second] = world.enrollments.as_slice() else {
        return Err(eyre::eyre!(
            "expected two enrollment responses, found {}",
            world.enrollments.len()
        ));
    };
    if first.id() != second.id() {
        return Err(eyre::eyre!(
            "expected the same enrollment, got {} and {}",
            first.id(),
            second.id()
        ));
    }
    Ok(())
}

#[then(r#"the enrollment status is "{status}""#)]
fn enrollment_status_is(world: &SequenceWorld, status: String) -> Result<(), eyre::Report> {
    let expected = EnrollmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let enrollment = world.latest_enrollment()?;

    if enrollment.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            enrollment.status().as_str()
        ));
    }
    Ok(())
}

#[then("the enrollment is at step {step:usize}")]
fn enrollment_is_at_step(world: &SequenceWorld, step: usize) -> Result<(), eyre::Report> {
    let enrollment = world.latest_enrollment()?;
    if enrollment.current_step() != step {
        return Err(eyre::eyre!(
            "expected step {step}, found {}",
            enrollment.current_step()
        ));
    }
    Ok(())
}

#[then("{count:usize} email has been queued for the contact")]
fn one_email_queued(world: &SequenceWorld, count: usize) -> Result<(), eyre::Report> {
    assert_queued(world, count)
}

#[then("{count:usize} emails have been queued for the contact")]
fn emails_queued(world: &SequenceWorld, count: usize) -> Result<(), eyre::Report> {
    assert_queued(world, count)
}

fn assert_queued(world: &SequenceWorld, count: usize) -> Result<(), eyre::Report> {
    let contact_id = world
        .contact_id
        .ok_or_else(|| eyre::eyre!("missing contact in scenario world"))?;
    let queued = world
        .queue
        .queued()
        .map_err(|err| eyre::eyre!("read queued emails: {err}"))?;
    let for_contact = queued
        .iter()
        .filter(|email| email.contact_id() == contact_id)
        .count();

    if for_contact != count {
        return Err(eyre::eyre!("expected {count} queued emails, found {for_contact}"));
    }
    Ok(())
}

#[then("the request fails with an invalid state transition error")]
fn request_fails_with_invalid_transition(world: &SequenceWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the request to fail"))?;

    if !matches!(
        error,
        SequenceServiceError::Domain(SequenceDomainError::InvalidStateTransition { .. })
    ) {
        return Err(eyre::eyre!(
            "expected InvalidStateTransition error, got {error:?}"
        ));
    }
    Ok(())
}
