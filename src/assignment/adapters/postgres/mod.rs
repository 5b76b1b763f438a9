//! `PostgreSQL` adapters for assignment persistence.

mod models;
mod repository;
mod schema;
mod workload;

pub use repository::{AssignmentPgPool, PostgresAssignmentRuleRepository};
pub use workload::PostgresLeadWorkload;
