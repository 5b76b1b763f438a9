//! Domain tests for templates, contacts and follow-up tasks.

use crate::outreach::domain::{
    ContactId, ContactProfile, EmailTemplate, FollowUpTask, OutreachDomainError,
};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn ada() -> ContactProfile {
    ContactProfile::new(ContactId::new())
        .with_first_name("Ada")
        .with_last_name("Lovelace")
        .with_email("ada@example.com")
        .with_company("Analytical Engines")
        .with_job_title("CTO")
}

#[rstest]
fn render_substitutes_contact_fields(ada: ContactProfile) {
    let template = EmailTemplate::new(
        "Intro",
        "Hello {{ first_name }} ",
        "Dear {{ full_name }}, how is {{ company }}?",
    )
    .expect("valid template");

    let rendered = template.render(&ada).expect("render should succeed");

    assert_eq!(rendered.subject, "Hello Ada");
    assert_eq!(rendered.body, "Dear Ada Lovelace, how is Analytical Engines?");
}

#[rstest]
fn render_uses_empty_strings_for_missing_fields() {
    let contact = ContactProfile::new(ContactId::new()).with_first_name("Grace");
    let template =
        EmailTemplate::new("Intro", "Hi {{ first_name }}", "[{{ company }}]").expect("valid");

    let rendered = template.render(&contact).expect("render should succeed");

    assert_eq!(rendered.body, "[]");
}

#[rstest]
fn render_reports_syntax_errors(ada: ContactProfile) {
    let template = EmailTemplate::new("Broken", "Hi", "{{ first_name").expect("valid");

    let result = template.render(&ada);

    assert!(matches!(
        result,
        Err(OutreachDomainError::TemplateRender { template_id, .. }) if template_id == template.id()
    ));
}

#[rstest]
#[case("", "Subject", OutreachDomainError::EmptyTemplateName)]
#[case("Name", "   ", OutreachDomainError::EmptyTemplateSubject)]
fn template_rejects_blank_values(
    #[case] name: &str,
    #[case] subject: &str,
    #[case] expected: OutreachDomainError,
) {
    let result = EmailTemplate::new(name, subject, "body");

    assert_eq!(result, Err(expected));
}

#[rstest]
#[case(Some("Ada"), Some("Lovelace"), "Ada Lovelace")]
#[case(Some("Ada"), None, "Ada")]
#[case(None, Some("Lovelace"), "Lovelace")]
#[case(None, None, "")]
fn full_name_skips_missing_parts(
    #[case] first: Option<&str>,
    #[case] last: Option<&str>,
    #[case] expected: &str,
) {
    let mut contact = ContactProfile::new(ContactId::new());
    if let Some(first) = first {
        contact = contact.with_first_name(first);
    }
    if let Some(last) = last {
        contact = contact.with_last_name(last);
    }

    assert_eq!(contact.full_name(), expected);
}

#[rstest]
fn blank_email_is_treated_as_missing() {
    let contact = ContactProfile::new(ContactId::new()).with_email("  ");

    assert_eq!(contact.email(), None);
}

#[rstest]
fn follow_up_requires_description() {
    let due = Utc
        .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .expect("valid timestamp");

    let result = FollowUpTask::new(ContactId::new(), "  ", due);

    assert_eq!(result, Err(OutreachDomainError::EmptyTaskDescription));
}
