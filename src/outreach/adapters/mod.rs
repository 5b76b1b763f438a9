//! Adapter implementations for outreach ports.

pub mod memory;
pub mod postgres;
