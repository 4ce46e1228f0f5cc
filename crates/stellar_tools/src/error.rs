//! Tool error types.

use std::path::PathBuf;

use stellar_core::error::EngineError;
use thiserror::Error;

/// Errors raised by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the input.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A command-line argument could not be parsed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
