//! When steps for sequence enrollment BDD scenarios.

use super::world::{SequenceWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn enroll(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    let sequence_id = world
        .sequence_id
        .ok_or_else(|| eyre::eyre!("missing sequence in scenario world"))?;
    let contact_id = world
        .contact_id
        .ok_or_else(|| eyre::eyre!("missing contact in scenario world"))?;
    let enrollment = run_async(world.service.enroll_contact(sequence_id, contact_id))
        .wrap_err("enroll contact")?;
    world.enrollments.push(enrollment);
    Ok(())
}

#[when("the contact is enrolled")]
fn contact_is_enrolled(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    enroll(world)
}

#[when("the contact is enrolled again")]
fn contact_is_enrolled_again(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    enroll(world)
}

#[when("the due steps are processed")]
fn due_steps_are_processed(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    run_async(world.service.process_due_steps()).wrap_err("process due steps")?;
    let enrollment_id = world.latest_enrollment()?.id();
    let refreshed = run_async(world.service.find_enrollment(enrollment_id))
        .wrap_err("reload enrollment")?
        .ok_or_else(|| eyre::eyre!("enrollment disappeared"))?;
    world.enrollments.push(refreshed);
    Ok(())
}

#[when("the enrollment is paused")]
fn enrollment_is_paused(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    let enrollment_id = world.latest_enrollment()?.id();
    let paused =
        run_async(world.service.pause_enrollment(enrollment_id)).wrap_err("pause enrollment")?;
    world.enrollments.push(paused);
    Ok(())
}

#[when("the enrollment is resumed")]
fn enrollment_is_resumed(world: &mut SequenceWorld) -> Result<(), eyre::Report> {
    let enrollment_id = world.latest_enrollment()?.id();
    match run_async(world.service.resume_enrollment(enrollment_id)) {
        Ok(resumed) => world.enrollments.push(resumed),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}
