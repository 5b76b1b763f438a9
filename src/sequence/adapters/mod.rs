//! Adapter implementations for sequence ports.

pub mod memory;
pub mod postgres;
