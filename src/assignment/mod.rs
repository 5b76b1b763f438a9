//! Lead auto-assignment.
//!
//! Active assignment rules are evaluated in creation order against incoming
//! lead attributes; the first match hands the lead to a candidate user either
//! by round-robin rotation or by picking the least-loaded candidate. The
//! module follows hexagonal architecture:
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
