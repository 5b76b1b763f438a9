//! Service layer for workflow rules.

mod workflow;

pub use workflow::{
    ConditionSpec, CreateWorkflowRuleRequest, WorkflowService, WorkflowServiceError,
    WorkflowServiceResult,
};
