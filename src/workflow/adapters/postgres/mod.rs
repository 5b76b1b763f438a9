//! `PostgreSQL` adapters for workflow persistence.

mod execution_log;
mod models;
mod repository;
mod schema;

pub use execution_log::PostgresExecutionLog;
pub use repository::{PostgresWorkflowRuleRepository, WorkflowPgPool};
