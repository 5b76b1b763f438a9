//! In-memory adapters for assignment tests and local flows.

mod rules;
mod workload;

pub use rules::InMemoryAssignmentRuleRepository;
pub use workload::InMemoryLeadWorkload;
