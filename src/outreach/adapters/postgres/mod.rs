//! `PostgreSQL` adapters for outreach persistence.

mod activity;
mod email_queue;
mod models;
mod schema;

pub use activity::PostgresActivityRecorder;
pub use email_queue::{OutreachPgPool, PostgresEmailQueue};
