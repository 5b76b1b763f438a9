//! Email templates and rendering.

use super::{ContactProfile, EmailTemplateId, OutreachDomainError};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reusable email template with `minijinja` subject and body.
///
/// Templates see `first_name`, `last_name`, `full_name`, `email`, `company`
/// and `job_title`; missing contact fields render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    id: EmailTemplateId,
    name: String,
    subject: String,
    body: String,
}

/// Subject and body produced by rendering a template for one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    /// Rendered subject line.
    pub subject: String,
    /// Rendered body.
    pub body: String,
}

impl EmailTemplate {
    /// Creates a template with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachDomainError::EmptyTemplateName`] or
    /// [`OutreachDomainError::EmptyTemplateSubject`] when either value is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, OutreachDomainError> {
        Self::with_id(EmailTemplateId::new(), name, subject, body)
    }

    /// Creates a template with a known identifier.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`EmailTemplate::new`].
    pub fn with_id(
        id: EmailTemplateId,
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, OutreachDomainError> {
        let trimmed_name = name.into().trim().to_owned();
        if trimmed_name.is_empty() {
            return Err(OutreachDomainError::EmptyTemplateName);
        }
        let subject_source = subject.into();
        if subject_source.trim().is_empty() {
            return Err(OutreachDomainError::EmptyTemplateSubject);
        }
        Ok(Self {
            id,
            name: trimmed_name,
            subject: subject_source,
            body: body.into(),
        })
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> EmailTemplateId {
        self.id
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw subject template.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the raw body template.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Renders subject and body for `contact`.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachDomainError::TemplateRender`] when either template
    /// fails to parse or evaluate.
    pub fn render(&self, contact: &ContactProfile) -> Result<RenderedEmail, OutreachDomainError> {
        let environment = Environment::new();
        let context = build_template_context(contact);
        let render = |source: &str| {
            environment
                .render_str(source, &context)
                .map_err(|error| OutreachDomainError::TemplateRender {
                    template_id: self.id,
                    reason: error.to_string(),
                })
        };
        Ok(RenderedEmail {
            subject: render(&self.subject)?.trim().to_owned(),
            body: render(&self.body)?,
        })
    }
}

fn build_template_context(contact: &ContactProfile) -> Map<String, Value> {
    let fields = [
        ("first_name", contact.first_name().unwrap_or_default().to_owned()),
        ("last_name", contact.last_name().unwrap_or_default().to_owned()),
        ("full_name", contact.full_name()),
        ("email", contact.email().unwrap_or_default().to_owned()),
        ("company", contact.company().unwrap_or_default().to_owned()),
        ("job_title", contact.job_title().unwrap_or_default().to_owned()),
    ];
    fields
        .into_iter()
        .map(|(key, value)| (key.to_owned(), Value::String(value)))
        .collect()
}
