//! Planets, their structures, and the passive entities around them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, LookupKind, Result};
use crate::resources::{ResourceBundle, ResourceKind, ResourceLedger};
use crate::time::Timestamp;

/// Planet identifier.
pub type PlanetId = String;

/// User identifier.
pub type UserId = String;

/// Location in the universe.
///
/// The galaxy index is a spatial axis like `x` and `y`, not a hop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Galaxy index.
    pub galaxy: i32,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(galaxy: i32, x: i32, y: i32) -> Self {
        Self { galaxy, x, y }
    }

    /// Euclidean distance over `(galaxy, x, y)`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dg = f64::from(self.galaxy) - f64::from(other.galaxy);
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dg * dg + dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}:{}]", self.galaxy, self.x, self.y)
    }
}

/// An in-progress structure upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionWindow {
    /// When the upgrade started.
    pub start: Timestamp,
    /// When the upgrade completes.
    pub finish: Timestamp,
    /// Levels gained on completion.
    pub levels_to_add: u32,
}

/// A structure built on a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Structure type key.
    #[serde(rename = "type")]
    pub structure_type: String,
    /// Current level.
    pub level: u32,
    /// Output throttle, 0-100.
    #[serde(default = "full_rate")]
    pub production_rate: u8,
    /// Upgrade in progress, if any.
    #[serde(default)]
    pub construction: Option<ConstructionWindow>,
}

const fn full_rate() -> u8 {
    100
}

impl Structure {
    /// Create an idle structure running at full rate.
    #[must_use]
    pub fn new(structure_type: impl Into<String>, level: u32) -> Self {
        Self {
            structure_type: structure_type.into(),
            level,
            production_rate: 100,
            construction: None,
        }
    }

    /// Set the output throttle, clamped to 100.
    #[must_use]
    pub fn with_production_rate(mut self, rate: u8) -> Self {
        self.production_rate = rate.min(100);
        self
    }

    /// Throttle as a factor in `[0, 1]`.
    #[must_use]
    pub fn rate_factor(&self) -> f64 {
        f64::from(self.production_rate.min(100)) / 100.0
    }

    /// Whether an upgrade is in progress.
    #[must_use]
    pub const fn is_upgrading(&self) -> bool {
        self.construction.is_some()
    }
}

/// A planet and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Unique planet id.
    pub id: PlanetId,
    /// Owning user; unowned planets exist.
    #[serde(default)]
    pub owner: Option<UserId>,
    /// Location.
    pub position: Position,
    /// Biome key.
    pub biome: String,
    /// Stored resources.
    pub resources: ResourceLedger,
    /// Built structures.
    #[serde(default)]
    pub structures: Vec<Structure>,
    /// Stationed ships by type.
    #[serde(default)]
    pub hangar: BTreeMap<String, u64>,
    /// Built defenses by type.
    #[serde(default)]
    pub defenses: BTreeMap<String, u64>,
}

impl Planet {
    /// Create an empty planet.
    #[must_use]
    pub fn new(
        id: impl Into<PlanetId>,
        position: Position,
        biome: impl Into<String>,
        resources: ResourceLedger,
    ) -> Self {
        Self {
            id: id.into(),
            owner: None,
            position,
            biome: biome.into(),
            resources,
            structures: Vec::new(),
            hangar: BTreeMap::new(),
            defenses: BTreeMap::new(),
        }
    }

    /// Set the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<UserId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Add a structure.
    #[must_use]
    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structures.push(structure);
        self
    }

    /// Structure of the given type, if built.
    #[must_use]
    pub fn structure(&self, structure_type: &str) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.structure_type == structure_type)
    }

    /// Structure of the given type, failing if absent.
    pub fn require_structure(&self, structure_type: &str) -> Result<&Structure> {
        self.structure(structure_type)
            .ok_or_else(|| EngineError::not_found(LookupKind::PlanetStructure, structure_type))
    }

    /// Mutable structure of the given type, created at level 0 if absent.
    pub fn structure_or_insert(&mut self, structure_type: &str) -> &mut Structure {
        let index = match self
            .structures
            .iter()
            .position(|s| s.structure_type == structure_type)
        {
            Some(index) => index,
            None => {
                self.structures.push(Structure::new(structure_type, 0));
                self.structures.len() - 1
            }
        };
        &mut self.structures[index]
    }

    /// Current level of a structure type, 0 if not built.
    #[must_use]
    pub fn structure_level(&self, structure_type: &str) -> u32 {
        self.structure(structure_type).map_or(0, |s| s.level)
    }

    /// Number of ships of a type stationed here.
    #[must_use]
    pub fn ships_of(&self, ship_type: &str) -> u64 {
        self.hangar.get(ship_type).copied().unwrap_or(0)
    }
}

/// Wreckage left after combat; a recycler target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebrisField {
    /// Unique id.
    pub id: String,
    /// Location.
    pub position: Position,
    /// Salvageable resources.
    pub resources: ResourceBundle,
}

/// A neutral trading post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outpost {
    /// Unique id.
    pub id: String,
    /// Location.
    pub position: Position,
    /// Resources the outpost buys.
    #[serde(default)]
    pub buys: Vec<ResourceKind>,
    /// Resources the outpost sells.
    #[serde(default)]
    pub sells: Vec<ResourceKind>,
    /// Exchange rate applied to trades, 1.0 is par.
    #[serde(default = "par_rate")]
    pub rate: f64,
}

const fn par_rate() -> f64 {
    1.0
}
