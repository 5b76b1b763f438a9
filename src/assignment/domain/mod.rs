//! Domain model for lead auto-assignment.
//!
//! Assignment rules pair an equality filter over lead attributes with an
//! ordered list of candidate users and a dispatch strategy. Persistence and
//! lead-ownership lookups stay outside this boundary.

mod error;
mod ids;
mod lead;
mod rule;

pub use error::{AssignmentDomainError, ParseAssignmentStrategyError, ParseLeadStatusError};
pub use ids::{AssignmentRuleId, AssignmentRuleName, UserId};
pub use lead::{LeadAttributes, LeadStatus};
pub use rule::{AssignmentFilters, AssignmentRule, AssignmentStrategy, PersistedAssignmentRuleData};
