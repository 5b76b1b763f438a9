//! Unit tests for the sequence module.

mod service_tests;
