//! Port contracts for sales sequences.

pub mod repository;

pub use repository::{SequenceRepository, SequenceRepositoryError, SequenceRepositoryResult};
