//! Versioned game configuration.
//!
//! Pure data tables deserialized from RON. A [`GameConfig`] is validated and
//! indexed once when built, then shared read-only by every engine call.
//!
//! **Note:** This module contains no IO - it parses text handed in by the
//! caller. File loading is handled by `stellar_tools`.

mod structure_config;
mod unit_config;
mod world_config;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::economy::ENERGY_STRUCTURE_TYPE;
use crate::error::{EngineError, LookupKind, Result};

pub use structure_config::{
    CostCurve, CostShape, LinearRate, ProductionSpec, StorageSpec, StructureConfig,
};
pub use unit_config::{DefenseConfig, ShipConfig};
pub use world_config::{BiomeConfig, BiomeModifier, ProductionBoost, ResearchConfig};

/// Global speed multipliers of a game universe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedMultipliers {
    /// Multiplier on all resource production.
    #[serde(default = "default_speed")]
    pub resources: f64,
    /// Multiplier on fleet travel speed.
    #[serde(default = "default_speed")]
    pub ships: f64,
}

const fn default_speed() -> f64 {
    1.0
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self {
            resources: 1.0,
            ships: 1.0,
        }
    }
}

/// Raw configuration tables as stored on disk.
///
/// # Example RON
///
/// ```ron
/// GameConfigData(
///     version: 3,
///     speed: (resources: 2.0, ships: 1.0),
///     structures: [ /* StructureConfig */ ],
///     ships: [ /* ShipConfig */ ],
///     defenses: [ /* DefenseConfig */ ],
///     research: [ /* ResearchConfig */ ],
///     biomes: [ /* BiomeConfig */ ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameConfigData {
    /// Config version, bumped on every balance change.
    pub version: u32,
    /// Global speed multipliers.
    #[serde(default)]
    pub speed: SpeedMultipliers,
    /// Structure table.
    #[serde(default)]
    pub structures: Vec<StructureConfig>,
    /// Ship table.
    #[serde(default)]
    pub ships: Vec<ShipConfig>,
    /// Defense table.
    #[serde(default)]
    pub defenses: Vec<DefenseConfig>,
    /// Research table.
    #[serde(default)]
    pub research: Vec<ResearchConfig>,
    /// Biome table.
    #[serde(default)]
    pub biomes: Vec<BiomeConfig>,
}

impl GameConfigData {
    /// Validate the tables, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.speed.resources.is_finite() && self.speed.resources > 0.0) {
            errors.push("speed.resources must be positive".to_string());
        }
        if !(self.speed.ships.is_finite() && self.speed.ships > 0.0) {
            errors.push("speed.ships must be positive".to_string());
        }

        check_unique("structure", self.structures.iter().map(|s| &s.id), &mut errors);
        check_unique("ship", self.ships.iter().map(|s| &s.id), &mut errors);
        check_unique("defense", self.defenses.iter().map(|d| &d.id), &mut errors);
        check_unique("research", self.research.iter().map(|r| &r.id), &mut errors);
        check_unique("biome", self.biomes.iter().map(|b| &b.id), &mut errors);

        for structure in &self.structures {
            errors.extend(structure.validate());
            if structure.energy_production.is_some() && structure.id != ENERGY_STRUCTURE_TYPE {
                errors.push(format!(
                    "structure '{}': only '{ENERGY_STRUCTURE_TYPE}' may produce energy",
                    structure.id
                ));
            }
        }
        errors.extend(self.ships.iter().flat_map(ShipConfig::validate));
        errors.extend(self.defenses.iter().flat_map(DefenseConfig::validate));
        errors.extend(self.biomes.iter().flat_map(BiomeConfig::validate));

        errors
    }
}

fn check_unique<'a>(
    table: &str,
    ids: impl Iterator<Item = &'a String>,
    errors: &mut Vec<String>,
) {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if id.is_empty() {
            errors.push(format!("{table} with empty id"));
        } else if !seen.insert(id.as_str()) {
            errors.push(format!("duplicate {table} id '{id}'"));
        }
    }
}

/// Validated, indexed game configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    data: GameConfigData,
    structures: HashMap<String, usize>,
    ships: HashMap<String, usize>,
    defenses: HashMap<String, usize>,
    research: HashMap<String, usize>,
    biomes: HashMap<String, usize>,
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (id(item).to_string(), i))
        .collect()
}

impl GameConfig {
    /// Validate and index configuration tables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigValidation`] listing every problem found.
    pub fn new(data: GameConfigData) -> Result<Self> {
        let errors = data.validate();
        if !errors.is_empty() {
            return Err(EngineError::ConfigValidation(errors));
        }

        let config = Self {
            structures: index_by_id(&data.structures, |s| &s.id),
            ships: index_by_id(&data.ships, |s| &s.id),
            defenses: index_by_id(&data.defenses, |d| &d.id),
            research: index_by_id(&data.research, |r| &r.id),
            biomes: index_by_id(&data.biomes, |b| &b.id),
            data,
        };

        tracing::debug!(
            version = config.data.version,
            structures = config.structures.len(),
            ships = config.ships.len(),
            defenses = config.defenses.len(),
            "Game config indexed"
        );

        Ok(config)
    }

    /// Parse, validate and index a RON document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigParse`] or [`EngineError::ConfigValidation`].
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let data: GameConfigData = ron::from_str(text)?;
        Self::new(data)
    }

    /// Raw tables.
    #[must_use]
    pub const fn data(&self) -> &GameConfigData {
        &self.data
    }

    /// Config version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.data.version
    }

    /// Global speed multipliers.
    #[must_use]
    pub const fn speed(&self) -> SpeedMultipliers {
        self.data.speed
    }

    /// Look up a structure by type key.
    pub fn structure(&self, id: &str) -> Result<&StructureConfig> {
        self.structures
            .get(id)
            .map(|&i| &self.data.structures[i])
            .ok_or_else(|| EngineError::not_found(LookupKind::Structure, id))
    }

    /// Look up a ship by type key.
    pub fn ship(&self, id: &str) -> Result<&ShipConfig> {
        self.ships
            .get(id)
            .map(|&i| &self.data.ships[i])
            .ok_or_else(|| EngineError::not_found(LookupKind::Ship, id))
    }

    /// Look up a ship without failing; used where a missing entry has a defined fallback.
    #[must_use]
    pub fn find_ship(&self, id: &str) -> Option<&ShipConfig> {
        self.ships.get(id).map(|&i| &self.data.ships[i])
    }

    /// Look up a defense by type key.
    pub fn defense(&self, id: &str) -> Result<&DefenseConfig> {
        self.defenses
            .get(id)
            .map(|&i| &self.data.defenses[i])
            .ok_or_else(|| EngineError::not_found(LookupKind::Defense, id))
    }

    /// Look up a research by key.
    pub fn research(&self, id: &str) -> Result<&ResearchConfig> {
        self.research
            .get(id)
            .map(|&i| &self.data.research[i])
            .ok_or_else(|| EngineError::not_found(LookupKind::Research, id))
    }

    /// Look up a biome by key.
    pub fn biome(&self, id: &str) -> Result<&BiomeConfig> {
        self.biomes
            .get(id)
            .map(|&i| &self.data.biomes[i])
            .ok_or_else(|| EngineError::not_found(LookupKind::Biome, id))
    }

    /// All structure definitions.
    pub fn structures(&self) -> impl Iterator<Item = &StructureConfig> {
        self.data.structures.iter()
    }

    /// All research definitions.
    pub fn all_research(&self) -> impl Iterator<Item = &ResearchConfig> {
        self.data.research.iter()
    }
}
