//! CRM engine: lead routing, sales sequences and workflow rules.
//!
//! This crate holds the business engines behind a CRM: assigning incoming
//! leads to sales users, walking contacts through timed outreach sequences,
//! evaluating workflow rules against entity events and scoring leads.
//!
//! # Architecture
//!
//! Each engine follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Orchestration over ports and an injected clock
//!
//! # Modules
//!
//! - [`assignment`]: Round-robin and load-balanced lead assignment
//! - [`sequence`]: Sales sequence enrollment and step sweeps
//! - [`workflow`]: Trigger and condition evaluation for workflow rules
//! - [`outreach`]: Email queueing and follow-up activities used by sequences
//! - [`scoring`]: Rule-based lead scoring
//! - [`cache`]: Time-bounded cache used for workflow rule lookups
//! - [`config`]: Engine settings and environment loading

pub mod assignment;
pub mod cache;
pub mod config;
pub mod outreach;
pub mod scoring;
pub mod sequence;
pub mod workflow;

#[cfg(test)]
mod test_support;
