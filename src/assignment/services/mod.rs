//! Application services for lead assignment.

mod assignment;

pub use assignment::{
    CreateAssignmentRuleRequest, LeadAssignmentError, LeadAssignmentResult, LeadAssignmentService,
};
