//! `PostgreSQL` adapters for sequence persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresSequenceRepository, SequencePgPool};
