//! Shared world state for sequence enrollment BDD scenarios.

use std::sync::Arc;

use crm_engine::outreach::{
    adapters::memory::{InMemoryActivityRecorder, InMemoryEmailQueue},
    domain::ContactId,
};
use crm_engine::sequence::{
    adapters::memory::InMemorySequenceRepository,
    domain::{Enrollment, SequenceId},
    services::{SequenceService, SequenceServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestSequenceService = SequenceService<
    InMemorySequenceRepository,
    InMemoryEmailQueue,
    InMemoryActivityRecorder,
    DefaultClock,
>;

/// Scenario world for sequence enrollment behaviour tests.
pub struct SequenceWorld {
    pub queue: Arc<InMemoryEmailQueue>,
    pub service: TestSequenceService,
    pub sequence_id: Option<SequenceId>,
    pub contact_id: Option<ContactId>,
    pub enrollments: Vec<Enrollment>,
    pub last_error: Option<SequenceServiceError>,
}

impl SequenceWorld {
    /// Creates a world with empty pending scenario state.
    #[must_use]
    pub fn new() -> Self {
        let queue = Arc::new(InMemoryEmailQueue::new());
        let service = SequenceService::new(
            Arc::new(InMemorySequenceRepository::new()),
            Arc::clone(&queue),
            Arc::new(InMemoryActivityRecorder::new()),
            Arc::new(DefaultClock),
        );

        Self {
            queue,
            service,
            sequence_id: None,
            contact_id: None,
            enrollments: Vec::new(),
            last_error: None,
        }
    }

    /// Returns the most recent enrollment snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when no enrollment has been recorded yet.
    pub fn latest_enrollment(&self) -> Result<&Enrollment, eyre::Report> {
        self.enrollments
            .last()
            .ok_or_else(|| eyre::eyre!("missing enrollment in scenario world"))
    }
}

impl Default for SequenceWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SequenceWorld {
    SequenceWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
