//! Service layer for sequence orchestration.

mod sequence;

pub use sequence::{
    CreateSequenceRequest, SequenceService, SequenceServiceError, SequenceServiceResult,
};
