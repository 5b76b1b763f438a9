//! Domain model for workflow rules.
//!
//! A rule listens to one entity event, checks an optional single-field
//! condition against the entity snapshot and, when it holds, hands back its
//! action list.

mod condition;
mod error;
mod execution;
mod ids;
mod rule;
mod trigger;

pub use condition::{Condition, ConditionOperator};
pub use error::{
    ParseEntityKindError, ParseExecutionStatusError, ParseTriggerEventError, WorkflowDomainError,
};
pub use execution::{
    EntityEvent, EvaluationMode, ExecutionStatus, PersistedWorkflowExecutionData, RuleResult,
    WorkflowExecution,
};
pub use ids::{WorkflowExecutionId, WorkflowRuleId, WorkflowRuleName};
pub use rule::{PersistedWorkflowRuleData, WorkflowRule};
pub use trigger::{EntityKind, Trigger, TriggerEvent};
