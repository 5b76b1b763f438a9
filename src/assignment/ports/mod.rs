//! Port contracts for lead assignment.
//!
//! Ports define infrastructure-agnostic interfaces used by the assignment
//! service.

pub mod repository;
pub mod workload;

pub use repository::{
    AssignmentRuleRepository, AssignmentRuleRepositoryError, AssignmentRuleRepositoryResult,
    RotationPick,
};
pub use workload::{LeadWorkloadError, LeadWorkloadReader, LeadWorkloadResult};
