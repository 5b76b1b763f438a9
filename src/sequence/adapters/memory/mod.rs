//! In-memory sequence adapters for tests and local flows.

mod repository;

pub use repository::InMemorySequenceRepository;
