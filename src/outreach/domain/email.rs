//! Outbound email queue records.

use super::{ContactId, EmailTemplateId, QueuedEmailId, RenderedEmail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered an outreach record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutreachOrigin {
    /// A sales sequence step.
    SequenceStep {
        /// Sequence identifier.
        sequence_id: Uuid,
        /// Enrollment identifier.
        enrollment_id: Uuid,
        /// Zero-based index of the step in the sequence.
        step_index: usize,
    },
}

/// Request to queue an email rendered from a stored template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedEmailRequest {
    /// Recipient contact.
    pub contact_id: ContactId,
    /// Template to render.
    pub template_id: EmailTemplateId,
    /// Record that triggered the email, if any.
    pub origin: Option<OutreachOrigin>,
}

impl TemplatedEmailRequest {
    /// Creates a request without an origin.
    #[must_use]
    pub const fn new(contact_id: ContactId, template_id: EmailTemplateId) -> Self {
        Self {
            contact_id,
            template_id,
            origin: None,
        }
    }

    /// Sets the origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: OutreachOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Email waiting for the delivery worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedEmail {
    id: QueuedEmailId,
    contact_id: ContactId,
    template_id: EmailTemplateId,
    recipient: String,
    subject: String,
    body: String,
    origin: Option<OutreachOrigin>,
    queued_at: DateTime<Utc>,
}

impl QueuedEmail {
    /// Status stored for freshly queued messages.
    pub const QUEUED_STATUS: &'static str = "queued";

    /// Creates a queued email from a rendered template.
    #[must_use]
    pub fn new(
        request: &TemplatedEmailRequest,
        recipient: impl Into<String>,
        rendered: RenderedEmail,
        queued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QueuedEmailId::new(),
            contact_id: request.contact_id,
            template_id: request.template_id,
            recipient: recipient.into(),
            subject: rendered.subject,
            body: rendered.body,
            origin: request.origin,
            queued_at,
        }
    }

    /// Returns the queued email identifier.
    #[must_use]
    pub const fn id(&self) -> QueuedEmailId {
        self.id
    }

    /// Returns the recipient contact.
    #[must_use]
    pub const fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    /// Returns the source template.
    #[must_use]
    pub const fn template_id(&self) -> EmailTemplateId {
        self.template_id
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Returns the rendered subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the rendered body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> Option<&OutreachOrigin> {
        self.origin.as_ref()
    }

    /// Returns the time the email was queued.
    #[must_use]
    pub const fn queued_at(&self) -> DateTime<Utc> {
        self.queued_at
    }
}
