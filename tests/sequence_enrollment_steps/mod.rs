//! Step definitions for sales sequence enrollment scenarios.

mod given;
mod then;
mod when;
pub mod world;
