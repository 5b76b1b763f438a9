//! Unit tests for the workflow module.
