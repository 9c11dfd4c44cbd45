//! Scenario and adversarial test suites for Scavenge reward pools.
//!
//! The integration tests under `tests/` drive whole pools through the
//! in-memory collaborators; [`helpers`] builds those fixtures.

pub mod helpers;
