//! Port contracts for workflow rules and their execution log.

pub mod execution_log;
pub mod repository;

pub use execution_log::{ExecutionLogError, ExecutionLogResult, WorkflowExecutionLog};
pub use repository::{
    WorkflowRuleRepository, WorkflowRuleRepositoryError, WorkflowRuleRepositoryResult,
};
