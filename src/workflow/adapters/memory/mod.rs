//! In-memory workflow adapters for tests and local flows.

mod execution_log;
mod repository;

pub use execution_log::InMemoryExecutionLog;
pub use repository::InMemoryWorkflowRuleRepository;
