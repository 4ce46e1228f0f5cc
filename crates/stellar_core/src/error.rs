//! Error types for the game engine.
//!
//! Affordability is deliberately absent: running out of metal is an expected
//! outcome and is reported through [`crate::economy::UpgradeCheck`] and
//! [`crate::queue::Admission`] instead.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Kind of record a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// A structure config entry.
    Structure,
    /// A ship config entry.
    Ship,
    /// A defense config entry.
    Defense,
    /// A research config entry.
    Research,
    /// A biome config entry.
    Biome,
    /// A structure instance on a planet.
    PlanetStructure,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Structure => "structure",
            Self::Ship => "ship",
            Self::Defense => "defense",
            Self::Research => "research",
            Self::Biome => "biome",
            Self::PlanetStructure => "planet structure",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced config entry or entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What was being looked up.
        kind: LookupKind,
        /// The key that failed to resolve.
        key: String,
    },

    /// Degenerate or malformed input (empty convoy, zero count, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse game config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration parsed but is internally inconsistent.
    #[error("Game config failed validation: {0:?}")]
    ConfigValidation(Vec<String>),
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(kind: LookupKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = EngineError::not_found(LookupKind::Ship, "dreadnought");
        assert_eq!(err.to_string(), "ship not found: dreadnought");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = EngineError::invalid("empty convoy");
        assert_eq!(err.to_string(), "Invalid input: empty convoy");
    }
}
