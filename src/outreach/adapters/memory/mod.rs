//! In-memory outreach adapters for tests and local flows.

mod activity;
mod email_queue;

pub use activity::InMemoryActivityRecorder;
pub use email_queue::InMemoryEmailQueue;
