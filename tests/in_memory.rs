//! In-memory integration tests.
//!
//! Tests are organized into modules by engine:
//! - `assignment_tests`: Rule matching, rotation and load balancing
//! - `sequence_flow_tests`: Enrollment and step sweeps end to end
//! - `workflow_tests`: Rule evaluation and execution logging

mod in_memory {
    mod assignment_tests;
    mod sequence_flow_tests;
    mod workflow_tests;
}
