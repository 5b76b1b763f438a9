//! Error types for assignment domain validation and parsing.

use super::AssignmentRuleId;
use thiserror::Error;

/// Errors returned while constructing or mutating assignment rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// The rule name is empty after trimming.
    #[error("assignment rule name must not be empty")]
    EmptyRuleName,

    /// The rule name exceeds the 255-character storage limit.
    #[error("assignment rule name exceeds 255 character limit: {0}")]
    RuleNameTooLong(String),

    /// A persisted rotation cursor points outside the candidate list.
    #[error(
        "rotation cursor {index} is out of range for rule {rule_id} with {candidates} candidates"
    )]
    RotationCursorOutOfRange {
        /// Rule identifier.
        rule_id: AssignmentRuleId,
        /// Offending cursor value.
        index: usize,
        /// Number of candidates on the rule.
        candidates: usize,
    },
}

/// Error returned while parsing an assignment strategy from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment strategy: {0}")]
pub struct ParseAssignmentStrategyError(pub String);

/// Error returned while parsing a lead status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lead status: {0}")]
pub struct ParseLeadStatusError(pub String);
