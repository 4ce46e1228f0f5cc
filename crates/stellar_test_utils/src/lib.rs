//! # Stellar Test Utilities
//!
//! Shared testing utilities for all crates:
//! - A complete test game configuration and entity fixtures
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
