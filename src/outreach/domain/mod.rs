//! Domain model for automated outreach.
//!
//! Outreach covers the records automation leaves behind for people and
//! delivery workers: templated emails waiting in the outbound queue and
//! follow-up activities on a contact's timeline.

mod activity;
mod contact;
mod email;
mod error;
mod ids;
mod template;

pub use activity::{Activity, ActivityKind, FollowUpTask};
pub use contact::ContactProfile;
pub use email::{OutreachOrigin, QueuedEmail, TemplatedEmailRequest};
pub use error::{OutreachDomainError, ParseActivityKindError};
pub use ids::{ActivityId, ContactId, EmailTemplateId, QueuedEmailId};
pub use template::{EmailTemplate, RenderedEmail};
