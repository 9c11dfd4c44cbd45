//! # scav-core
//! Foundation types and traits for Scavenge reward pools.
//!
//! The pool engine talks to the outside world only through the traits in
//! [`traits`]; the in-memory implementations in [`clock`], [`token`] and
//! [`registry`] back the test suites and the simulator binary.

pub mod clock;
pub mod constants;
pub mod error;
pub mod registry;
pub mod token;
pub mod traits;
pub mod types;
