//! Test fixtures and helpers.
//!
//! A complete game configuration plus pre-built planets, manifests and
//! ship parts for consistent testing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stellar_core::config::GameConfig;
use stellar_core::economy::ResearchLevels;
use stellar_core::fleet::ShipManifest;
use stellar_core::planet::{Planet, Position, Structure};
use stellar_core::resources::ResourceLedger;
use stellar_core::ship_generator::{Rarity, ShipBlueprint, ShipComponent, ShipStats};
use stellar_core::time::Timestamp;

/// Configuration used across integration tests.
///
/// Production rates are per second before boosts. Build times use simple
/// curves so expected timestamps are easy to compute by hand.
pub const TEST_CONFIG_RON: &str = r#"(
    version: 1,
    speed: (resources: 1.0, ships: 1.0),
    structures: [
        (
            id: "metal_mine",
            name: "Metal Mine",
            cost: (base: 60.0, per_level: 40.0),
            build_time: (base: 30.0, per_level: 10.0),
            production: Some((resource: Some(metal), base: 0.0, per_level: 1.0)),
            energy_consumption: Some((base: 0.0, per_level: 10.0)),
        ),
        (
            id: "deuterium_synthesizer",
            name: "Deuterium Synthesizer",
            cost: (base: 10.0, power: 1.5),
            build_time: (base: 60.0),
            production: Some((resource: Some(deuterium), base: 0.0, per_level: 0.5)),
            energy_consumption: Some((base: 0.0, per_level: 20.0)),
        ),
        (
            id: "microchip_factory",
            name: "Microchip Factory",
            cost: (base: 500.0),
            build_time: (base: 120.0),
            production: Some((resource: Some(microchips), base: 0.0, per_level: 0.1)),
            energy_consumption: Some((base: 0.0, per_level: 15.0)),
        ),
        (
            id: "solar_plant",
            name: "Solar Plant",
            cost: (base: 75.0, per_level: 50.0),
            build_time: (base: 45.0),
            energy_production: Some((base: 0.0, per_level: 20.0)),
        ),
        (
            id: "metal_storage",
            name: "Metal Storage",
            cost: (base: 1000.0),
            build_time: (base: 90.0),
            storage: Some((resource: metal, base: 10000.0, per_level: 5000.0)),
        ),
        (
            id: "command_center",
            name: "Command Center",
            cost: (base: 400.0, per_level: 200.0),
            build_time: (base: 60.0, per_level: 30.0),
            production: Some((resource: None)),
        ),
    ],
    ships: [
        (id: "fighter", cost: (metal: 300.0, deuterium: 100.0), build_time: 20, speed: 12500.0, capacity: 50.0),
        (id: "cruiser", cost: (metal: 2000.0, deuterium: 700.0), build_time: 60, speed: 8000.0, capacity: 800.0),
        (id: "transporter", cost: (metal: 1500.0, deuterium: 500.0), build_time: 45, speed: 5000.0, capacity: 5000.0),
        (id: "recycler", cost: (metal: 1000.0, deuterium: 600.0), build_time: 90, speed: 2000.0, capacity: 20000.0),
        (id: "probe", cost: (deuterium: 100.0), build_time: 5, speed: 100000.0, capacity: 5.0),
    ],
    defenses: [
        (id: "laser_turret", cost: (metal: 150.0), build_time: 15),
        (id: "plasma_cannon", cost: (metal: 5000.0, deuterium: 3000.0, microchips: 300.0), build_time: 120),
    ],
    research: [
        (id: "advanced_mining", production_boosts: [(resource: metal, percent_per_level: 10.0)]),
        (id: "fuel_refining", production_boosts: [(resource: deuterium, percent_per_level: 5.0)]),
    ],
    biomes: [
        (id: "barren"),
        (id: "volcanic", production_modifiers: [
            (resource: metal, percent: 50.0),
            (resource: deuterium, percent: -20.0),
        ]),
        (id: "oceanic", production_modifiers: [(resource: deuterium, percent: 30.0)]),
    ],
)"#;

/// Parsed and validated [`TEST_CONFIG_RON`].
///
/// # Panics
///
/// Panics if the fixture no longer parses; that is a bug in this crate.
#[must_use]
pub fn test_config() -> GameConfig {
    match GameConfig::from_ron_str(TEST_CONFIG_RON) {
        Ok(config) => config,
        Err(e) => panic!("test config fixture is invalid: {e}"),
    }
}

/// Owned home planet on a barren world.
///
/// Metal mine 5, solar plant 5, metal storage 1; 10k metal, 5k deuterium,
/// 1k microchips; a few ships in the hangar.
#[must_use]
pub fn home_planet(now: Timestamp) -> Planet {
    let mut planet = Planet::new(
        "home",
        Position::new(1, 100, 200),
        "barren",
        ResourceLedger::new(10_000.0, 5_000.0, 1_000.0, now),
    )
    .with_owner("player")
    .with_structure(Structure::new("metal_mine", 5))
    .with_structure(Structure::new("solar_plant", 5))
    .with_structure(Structure::new("metal_storage", 1));
    planet.hangar = manifest(&[("cruiser", 4), ("transporter", 2), ("recycler", 1)]);
    planet
}

/// Unowned planet with nothing built.
#[must_use]
pub fn empty_planet(id: &str, position: Position, biome: &str, now: Timestamp) -> Planet {
    Planet::new(id, position, biome, ResourceLedger::new(0.0, 0.0, 0.0, now))
}

/// Build a manifest from `(ship_type, count)` pairs.
#[must_use]
pub fn manifest(entries: &[(&str, u64)]) -> ShipManifest {
    entries
        .iter()
        .map(|(ship_type, count)| ((*ship_type).to_string(), *count))
        .collect()
}

/// Build research levels from `(research, level)` pairs.
#[must_use]
pub fn research(entries: &[(&str, u32)]) -> ResearchLevels {
    entries
        .iter()
        .map(|(id, level)| ((*id).to_string(), *level))
        .collect()
}

/// Frigate blueprint of the given rarity.
#[must_use]
pub fn blueprint(rarity: Rarity) -> ShipBlueprint {
    ShipBlueprint {
        id: "bp_frigate".to_string(),
        ship_type: "frigate".to_string(),
        rarity,
        base_stats: ShipStats {
            speed: 9000.0,
            capacity: 300.0,
            attack: 40.0,
            defense: 30.0,
            ..Default::default()
        },
    }
}

/// Component of the given rarity adding attack and shield.
#[must_use]
pub fn component(id: &str, rarity: Rarity) -> ShipComponent {
    ShipComponent {
        id: id.to_string(),
        rarity,
        stats: ShipStats {
            attack: 5.0,
            shield: 10.0,
            ..Default::default()
        },
    }
}

/// Seeded RNG for reproducible generation.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_config_is_complete() {
        let config = test_config();
        assert_eq!(config.version(), 1);
        assert!(config.structure("metal_mine").is_ok());
        assert!(config.ship("transporter").is_ok());
        assert!(config.defense("plasma_cannon").is_ok());
        assert!(config.research("advanced_mining").is_ok());
        assert!(config.biome("volcanic").is_ok());
    }

    #[test]
    fn test_home_planet_types_resolve() {
        let config = test_config();
        let planet = home_planet(Timestamp::EPOCH);
        for structure in &planet.structures {
            assert!(config.structure(&structure.structure_type).is_ok());
        }
        for ship_type in planet.hangar.keys() {
            assert!(config.ship(ship_type).is_ok());
        }
        assert!(config.biome(&planet.biome).is_ok());
    }
}
