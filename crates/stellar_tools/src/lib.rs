//! # Stellar Development Tools
//!
//! Command-line tools for balancing and operations:
//! - Game config validation
//! - Structure cost and build time tables
//! - Fleet travel time and reputation calculators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod tables;
pub mod validate;

pub use error::{Result, ToolError};
