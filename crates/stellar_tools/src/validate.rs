//! Config loading and validation.

use std::path::{Path, PathBuf};

use stellar_core::config::GameConfig;
use stellar_core::error::EngineError;

use crate::error::{Result, ToolError};

/// Read and validate a RON game config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = GameConfig::from_ron_str(&text)?;
    tracing::debug!(path = %path.display(), version = config.version(), "Loaded game config");
    Ok(config)
}

/// Summary of a validated config file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    /// File checked.
    pub path: PathBuf,
    /// Config version.
    pub version: u32,
    /// Structure count.
    pub structures: usize,
    /// Ship count.
    pub ships: usize,
    /// Defense count.
    pub defenses: usize,
    /// Research count.
    pub research: usize,
    /// Biome count.
    pub biomes: usize,
}

/// Validate a config file, logging every problem found.
///
/// # Errors
///
/// Returns an error if the file fails to load or validate.
pub fn validate_config_file(path: &Path) -> Result<ValidationReport> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(ToolError::Engine(EngineError::ConfigValidation(problems))) => {
            for problem in &problems {
                tracing::error!(path = %path.display(), "{problem}");
            }
            return Err(EngineError::ConfigValidation(problems).into());
        }
        Err(e) => return Err(e),
    };

    let data = config.data();
    Ok(ValidationReport {
        path: path.to_path_buf(),
        version: data.version,
        structures: data.structures.len(),
        ships: data.ships.len(),
        defenses: data.defenses.len(),
        research: data.research.len(),
        biomes: data.biomes.len(),
    })
}
