//! Unit tests for the outreach module.

mod domain_tests;
