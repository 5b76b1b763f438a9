//! Error types for outreach domain validation and rendering.

use super::EmailTemplateId;
use thiserror::Error;

/// Errors returned while building or rendering outreach values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutreachDomainError {
    /// The template name is empty after trimming.
    #[error("email template name must not be empty")]
    EmptyTemplateName,

    /// The template subject is empty after trimming.
    #[error("email template subject must not be empty")]
    EmptyTemplateSubject,

    /// The follow-up task description is empty after trimming.
    #[error("follow-up task description must not be empty")]
    EmptyTaskDescription,

    /// A template failed to render.
    #[error("failed to render email template {template_id}: {reason}")]
    TemplateRender {
        /// Template identifier.
        template_id: EmailTemplateId,
        /// Renderer diagnostic.
        reason: String,
    },
}

/// Error returned while parsing an activity kind from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity kind: {0}")]
pub struct ParseActivityKindError(pub String);
