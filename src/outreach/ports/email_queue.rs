//! Email queue port used by automation to hand messages to delivery.

use crate::outreach::domain::{
    ContactId, ContactProfile, EmailTemplate, EmailTemplateId, OutreachDomainError, QueuedEmail,
    TemplatedEmailRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for email queue operations.
pub type EmailQueueResult<T> = Result<T, EmailQueueError>;

/// Queues rendered emails for later delivery.
#[async_trait]
pub trait EmailQueue: Send + Sync {
    /// Renders the requested template for the contact and queues the result.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError`] when the template or contact is unknown,
    /// the contact has no email address, rendering fails, or the queue
    /// rejects the message.
    async fn queue_templated(
        &self,
        request: &TemplatedEmailRequest,
        queued_at: DateTime<Utc>,
    ) -> EmailQueueResult<QueuedEmail>;
}

/// Errors returned by email queue adapters.
#[derive(Debug, Clone, Error)]
pub enum EmailQueueError {
    /// The template does not exist.
    #[error("email template not found: {0}")]
    TemplateNotFound(EmailTemplateId),

    /// The contact does not exist.
    #[error("contact not found: {0}")]
    ContactNotFound(ContactId),

    /// The contact has no usable email address.
    #[error("contact {0} has no email address")]
    MissingRecipient(ContactId),

    /// Rendering failed.
    #[error(transparent)]
    Domain(#[from] OutreachDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EmailQueueError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Renders `template` for `contact` and builds the queue record.
///
/// Adapters call this once they have resolved the template and contact for
/// `request`.
///
/// # Errors
///
/// Returns [`EmailQueueError::MissingRecipient`] when the contact has no
/// email address, or [`EmailQueueError::Domain`] when rendering fails.
pub fn compose_queued_email(
    request: &TemplatedEmailRequest,
    template: &EmailTemplate,
    contact: &ContactProfile,
    queued_at: DateTime<Utc>,
) -> EmailQueueResult<QueuedEmail> {
    let recipient = contact
        .email()
        .ok_or(EmailQueueError::MissingRecipient(contact.id()))?;
    let rendered = template.render(contact)?;
    Ok(QueuedEmail::new(request, recipient, rendered, queued_at))
}
