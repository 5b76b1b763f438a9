//! Error types for workflow domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating workflow rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The rule name is empty after trimming.
    #[error("workflow rule name must not be empty")]
    EmptyRuleName,

    /// The rule name exceeds the 255-character storage limit.
    #[error("workflow rule name exceeds 255 character limit: {0}")]
    RuleNameTooLong(String),

    /// The condition field is empty after trimming.
    #[error("workflow condition field must not be empty")]
    EmptyConditionField,

    /// The condition operator is not one of the supported comparisons.
    #[error("unsupported workflow condition operator: {0}")]
    UnsupportedOperator(String),
}

/// Error returned while parsing an entity kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

/// Error returned while parsing a trigger event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown trigger event: {0}")]
pub struct ParseTriggerEventError(pub String);

/// Error returned while parsing an execution status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown execution status: {0}")]
pub struct ParseExecutionStatusError(pub String);
