//! Automated outreach records.
//!
//! Sequences and workflows do not talk to mail servers or calendars directly.
//! They queue templated emails and create follow-up tasks through the ports
//! defined here, and delivery happens elsewhere. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
