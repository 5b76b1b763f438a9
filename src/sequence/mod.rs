//! Sales sequences.
//!
//! Contacts are enrolled into an ordered list of email, wait and task steps.
//! A sweep picks up every enrollment whose next step is due, runs that step
//! through the outreach ports and moves the enrollment's cursor forward until
//! the sequence is exhausted. The module follows hexagonal architecture:
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
