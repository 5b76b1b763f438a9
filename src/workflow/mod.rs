//! Workflow rules.
//!
//! Rules listen to entity events (a lead being created, a contact being
//! updated) and, when their optional condition holds against the entity
//! snapshot, report their action list. Live evaluations append one execution
//! per evaluated rule to a log; dry runs only preview. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
