//! Balance tables and calculators printed by the CLI.

use serde::Serialize;
use stellar_core::config::GameConfig;
use stellar_core::economy::{
    structure_energy_consumption, structure_energy_production, upgrade_structure_duration,
};
use stellar_core::fleet::{calculate_fleet_arrival_time, convoy_capacity, ShipManifest};
use stellar_core::planet::Position;
use stellar_core::progression::{calculate_reputation_level, required_points_for_level};
use stellar_core::time::Timestamp;

use crate::error::{Result, ToolError};

/// One row of a structure balance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureLevelRow {
    /// Target level.
    pub level: u32,
    /// Metal to reach this level from the previous one.
    pub metal_cost: u64,
    /// Seconds to reach this level from the previous one.
    pub build_seconds: u64,
    /// Energy drawn at this level.
    pub energy_consumption: f64,
    /// Energy generated at this level.
    pub energy_production: f64,
}

/// Cost, time and energy for levels `from..=to` of a structure.
///
/// # Errors
///
/// Returns an error if the structure type is unknown.
pub fn structure_table(
    config: &GameConfig,
    structure_type: &str,
    from: u32,
    to: u32,
) -> Result<Vec<StructureLevelRow>> {
    let structure = config.structure(structure_type)?;
    (from.max(1)..=to)
        .map(|level| -> Result<StructureLevelRow> {
            Ok(StructureLevelRow {
                level,
                metal_cost: structure.cost.cost_at(level, 1.0),
                build_seconds: upgrade_structure_duration(config, structure_type, level - 1, 1)?,
                energy_consumption: structure_energy_consumption(config, structure_type, level)?,
                energy_production: structure_energy_production(config, structure_type, level)?,
            })
        })
        .collect()
}

/// Parse a `galaxy:x:y` position.
///
/// # Errors
///
/// Returns an error unless the text holds exactly three integers.
pub fn parse_position(text: &str) -> Result<Position> {
    let parts: Vec<&str> = text.trim_matches(|c: char| c == '[' || c == ']').split(':').collect();
    let [galaxy, x, y] = parts.as_slice() else {
        return Err(ToolError::InvalidArgument(format!(
            "position '{text}' must look like galaxy:x:y"
        )));
    };
    let parse = |part: &str| {
        part.trim().parse::<i32>().map_err(|_| {
            ToolError::InvalidArgument(format!("position '{text}' has a non-integer part '{part}'"))
        })
    };
    Ok(Position::new(parse(*galaxy)?, parse(*x)?, parse(*y)?))
}

/// Parse a `type=count,type=count` manifest.
///
/// # Errors
///
/// Returns an error on a malformed entry.
pub fn parse_manifest(text: &str) -> Result<ShipManifest> {
    let mut ships = ShipManifest::new();
    for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((ship_type, count)) = entry.split_once('=') else {
            return Err(ToolError::InvalidArgument(format!(
                "manifest entry '{entry}' must look like type=count"
            )));
        };
        let count: u64 = count.trim().parse().map_err(|_| {
            ToolError::InvalidArgument(format!("manifest entry '{entry}' has a bad count"))
        })?;
        *ships.entry(ship_type.trim().to_string()).or_insert(0) += count;
    }
    Ok(ships)
}

/// Travel estimate for a convoy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelEstimate {
    /// Straight-line distance.
    pub distance: f64,
    /// One-way travel time.
    pub travel_seconds: u64,
    /// Cargo capacity of the convoy.
    pub capacity: f64,
}

/// Estimate travel between two positions.
///
/// # Errors
///
/// Returns an error for an empty convoy or unknown ship types.
pub fn travel_estimate(
    config: &GameConfig,
    ships: &ShipManifest,
    from: Position,
    to: Position,
) -> Result<TravelEstimate> {
    let (_, travel_seconds) =
        calculate_fleet_arrival_time(config, ships, from, to, Timestamp::EPOCH)?;
    Ok(TravelEstimate {
        distance: from.distance(to),
        travel_seconds,
        capacity: convoy_capacity(config, ships)?,
    })
}

/// One row of the reputation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReputationRow {
    /// Level.
    pub level: u32,
    /// Minimum points for the level.
    pub points: u64,
}

/// Reputation curve for levels `0..=max_level`.
#[must_use]
pub fn reputation_table(max_level: u32) -> Vec<ReputationRow> {
    (0..=max_level)
        .map(|level| ReputationRow {
            level,
            points: required_points_for_level(level),
        })
        .collect()
}

/// Level for a point total.
#[must_use]
pub fn reputation_level(points: i64) -> u32 {
    calculate_reputation_level(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_test_utils::fixtures::test_config;

    #[test]
    fn test_structure_table() {
        let config = test_config();
        let rows = structure_table(&config, "metal_mine", 1, 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].metal_cost, 100);
        assert_eq!(rows[0].build_seconds, 40);
        assert_eq!(rows[2].energy_consumption, 30.0);
        assert_eq!(rows[2].energy_production, 0.0);

        assert!(structure_table(&config, "warp_gate", 1, 3).is_err());
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("1:2:3").unwrap(), Position::new(1, 2, 3));
        assert_eq!(parse_position("[0:-5:7]").unwrap(), Position::new(0, -5, 7));
        assert!(parse_position("1:2").is_err());
        assert!(parse_position("a:b:c").is_err());
    }

    #[test]
    fn test_parse_manifest() {
        let ships = parse_manifest("cruiser=2, transporter=1").unwrap();
        assert_eq!(ships["cruiser"], 2);
        assert_eq!(ships["transporter"], 1);
        assert!(parse_manifest("cruiser").is_err());
        assert!(parse_manifest("cruiser=many").is_err());
    }

    #[test]
    fn test_travel_estimate() {
        let config = test_config();
        let ships = parse_manifest("cruiser=2,transporter=1").unwrap();
        let estimate = travel_estimate(
            &config,
            &ships,
            Position::new(0, 0, 0),
            Position::new(0, 30_000, 40_000),
        )
        .unwrap();
        assert_eq!(estimate.distance, 50_000.0);
        assert_eq!(estimate.travel_seconds, 10);
        assert_eq!(estimate.capacity, 6_600.0);
    }

    #[test]
    fn test_reputation_table() {
        let rows = reputation_table(3);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].points, 50);
        assert_eq!(reputation_level(rows[3].points as i64), 3);
    }
}
