//! Port contracts for outreach collaborators.

pub mod activity;
pub mod email_queue;

pub use activity::{ActivityRecorder, ActivityRecorderError, ActivityRecorderResult};
pub use email_queue::{EmailQueue, EmailQueueError, EmailQueueResult, compose_queued_email};
