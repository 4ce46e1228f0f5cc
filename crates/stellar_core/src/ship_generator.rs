//! Procedural ship generation from a blueprint and installed components.
//!
//! Consuming the blueprint and components from inventory is the caller's
//! job; this module only produces the new [`Ship`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::planet::UserId;
use crate::time::Timestamp;

/// Rarity tier of a ship, blueprint or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Lowest tier.
    #[default]
    Common,
    /// Second tier.
    Rare,
    /// Third tier.
    Epic,
    /// Highest tier.
    Legendary,
}

impl Rarity {
    /// Points a blueprint of this rarity contributes.
    #[must_use]
    pub const fn blueprint_points(self) -> u32 {
        match self {
            Self::Common => 10,
            Self::Rare => 25,
            Self::Epic => 50,
            Self::Legendary => 100,
        }
    }

    /// Points an installed component of this rarity contributes.
    #[must_use]
    pub const fn component_points(self) -> u32 {
        match self {
            Self::Common => 2,
            Self::Rare => 5,
            Self::Epic => 10,
            Self::Legendary => 20,
        }
    }

    /// Tier reached by a point total. Thresholds are inclusive lower bounds.
    #[must_use]
    pub const fn for_points(points: u32) -> Self {
        match points {
            150.. => Self::Legendary,
            80.. => Self::Epic,
            35.. => Self::Rare,
            _ => Self::Common,
        }
    }
}

/// Combat and logistics stats.
///
/// Fields missing from a document read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ShipStats {
    pub speed: f64,
    pub capacity: f64,
    pub attack: f64,
    pub defense: f64,
    pub shield: f64,
    pub evasion: f64,
    pub accuracy: f64,
    pub critical_chance: f64,
    pub fire_rate: f64,
    pub initiative: f64,
}

impl ShipStats {
    /// Add `delta` to every axis.
    pub fn add(&mut self, delta: &Self) {
        self.speed += delta.speed;
        self.capacity += delta.capacity;
        self.attack += delta.attack;
        self.defense += delta.defense;
        self.shield += delta.shield;
        self.evasion += delta.evasion;
        self.accuracy += delta.accuracy;
        self.critical_chance += delta.critical_chance;
        self.fire_rate += delta.fire_rate;
        self.initiative += delta.initiative;
    }
}

/// A consumable ship blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipBlueprint {
    /// Blueprint id.
    pub id: String,
    /// Ship type produced.
    pub ship_type: String,
    /// Blueprint rarity.
    pub rarity: Rarity,
    /// Stats before components.
    #[serde(default)]
    pub base_stats: ShipStats,
}

/// A component installed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipComponent {
    /// Component id.
    pub id: String,
    /// Component rarity.
    pub rarity: Rarity,
    /// Stat deltas.
    #[serde(default)]
    pub stats: ShipStats,
}

/// Lifecycle status of an individual ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipStatus {
    /// Parked at a planet.
    #[default]
    Stationed,
    /// Part of a fleet in flight.
    Traveling,
    /// Under repair.
    Repairing,
    /// Lost in combat.
    Destroyed,
}

/// Where a ship came from. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// User who built the ship.
    pub created_by: UserId,
    /// Build instant.
    pub created_at: Timestamp,
    /// Blueprint consumed.
    pub blueprint_id: String,
    /// Components installed, in order.
    pub component_ids: Vec<String>,
}

/// An individually tracked ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Unique id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Ship type key.
    pub ship_type: String,
    /// Final rarity.
    pub rarity: Rarity,
    /// Aggregated stats.
    pub stats: ShipStats,
    /// Hull integrity, 0-100.
    pub integrity: u8,
    /// Experience level.
    pub level: u32,
    /// Experience points.
    pub xp: u64,
    /// Owning user.
    pub owner: UserId,
    /// Lifecycle status.
    pub status: ShipStatus,
    /// Creation record.
    pub provenance: Provenance,
}

const NAME_PREFIXES: [&str; 8] = [
    "Astral", "Crimson", "Silent", "Iron", "Solar", "Void", "Radiant", "Obsidian",
];

const NAME_SUFFIXES: [&str; 8] = [
    "Falcon", "Warden", "Lance", "Comet", "Specter", "Herald", "Tempest", "Nomad",
];

/// Total rarity points of a blueprint plus its components.
#[must_use]
pub fn rarity_points(blueprint: &ShipBlueprint, components: &[ShipComponent]) -> u32 {
    components
        .iter()
        .map(|c| c.rarity.component_points())
        .sum::<u32>()
        + blueprint.rarity.blueprint_points()
}

/// Pick a display name like `Silent Comet-417`.
///
/// The words follow the build's shape, the number is random.
pub fn generate_name<R: Rng + ?Sized>(
    blueprint: &ShipBlueprint,
    components: &[ShipComponent],
    rng: &mut R,
) -> String {
    let seed = blueprint.id.len()
        + components.len()
        + components.first().map_or(0, |c| c.id.len());
    let prefix = NAME_PREFIXES[seed % NAME_PREFIXES.len()];
    let suffix = NAME_SUFFIXES[(seed / NAME_PREFIXES.len() + seed) % NAME_SUFFIXES.len()];
    let number: u16 = rng.gen_range(100..1000);
    format!("{prefix} {suffix}-{number}")
}

/// Blueprint base stats plus every component delta.
#[must_use]
pub fn aggregate_stats(blueprint: &ShipBlueprint, components: &[ShipComponent]) -> ShipStats {
    let mut stats = blueprint.base_stats;
    for component in components {
        stats.add(&component.stats);
    }
    stats
}

/// Build a new ship owned by `owner`.
pub fn generate_ship<R: Rng + ?Sized>(
    blueprint: &ShipBlueprint,
    components: &[ShipComponent],
    owner: &str,
    now: Timestamp,
    rng: &mut R,
) -> Ship {
    let points = rarity_points(blueprint, components);
    let rarity = Rarity::for_points(points);
    let name = generate_name(blueprint, components, rng);
    let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();

    tracing::debug!(
        ship = %id,
        name = %name,
        blueprint = %blueprint.id,
        components = components.len(),
        points,
        ?rarity,
        "Ship generated"
    );

    Ship {
        id,
        name,
        ship_type: blueprint.ship_type.clone(),
        rarity,
        stats: aggregate_stats(blueprint, components),
        integrity: 100,
        level: 1,
        xp: 0,
        owner: owner.to_string(),
        status: ShipStatus::Stationed,
        provenance: Provenance {
            created_by: owner.to_string(),
            created_at: now,
            blueprint_id: blueprint.id.clone(),
            component_ids: components.iter().map(|c| c.id.clone()).collect(),
        },
    }
}
