//! Given steps for sequence enrollment BDD scenarios.

use super::world::{SequenceWorld, run_async};
use crm_engine::outreach::domain::{ContactId, ContactProfile, EmailTemplate};
use crm_engine::sequence::{domain::SequenceStep, services::CreateSequenceRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a sequence "{name}" with an immediate welcome email"#)]
fn sequence_with_welcome_email(world: &mut SequenceWorld, name: String) -> Result<(), eyre::Report> {
    let template = EmailTemplate::new("Welcome", "Welcome, {{ first_name }}", "Glad to meet you.")
        .wrap_err("build welcome template")?;
    let template_id = template.id();
    world
        .queue
        .add_template(template)
        .wrap_err("store welcome template")?;

    let sequence = run_async(world.service.create_sequence(CreateSequenceRequest::new(
        name,
        [SequenceStep::email(0, template_id)],
    )))
    .wrap_err("create sequence for scenario")?;
    world.sequence_id = Some(sequence.id());
    Ok(())
}

#[given(r#"a contact "{first_name}" with an email address"#)]
fn contact_with_email(world: &mut SequenceWorld, first_name: String) -> Result<(), eyre::Report> {
    let email = format!("{}@example.com", first_name.to_lowercase());
    let contact = ContactProfile::new(ContactId::new())
        .with_first_name(first_name)
        .with_email(email);
    world.contact_id = Some(contact.id());
    world
        .queue
        .add_contact(contact)
        .wrap_err("store scenario contact")?;
    Ok(())
}
