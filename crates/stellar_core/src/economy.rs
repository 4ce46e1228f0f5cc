//! Economy calculator: production, energy, storage, costs and upgrades.
//!
//! Production is never ticked. A planet's ledger records the instant up to
//! which production has been applied (`last_update`); [`advance_planet`]
//! integrates the rates from there to an explicit `now`, splitting the
//! interval wherever a structure upgrade completes.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::config::{CostCurve, GameConfig};
use crate::error::{EngineError, Result};
use crate::planet::{ConstructionWindow, Planet};
use crate::resources::{ResourceBundle, ResourceKind};
use crate::time::{Timestamp, SECONDS_PER_HOUR};

/// The only structure type whose energy production is honoured.
pub const ENERGY_STRUCTURE_TYPE: &str = "solar_plant";

/// Research levels of a user, keyed by research id.
pub type ResearchLevels = BTreeMap<String, u32>;

// ============================================================================
// Boosts
// ============================================================================

/// Research multiplier for a resource: `1 + Σ(level * percent_per_level) / 100`.
pub fn research_boost(
    config: &GameConfig,
    research: &ResearchLevels,
    resource: ResourceKind,
) -> Result<f64> {
    let mut percent = 0.0;
    for (id, &level) in research {
        percent += config.research(id)?.percent_per_level(resource) * f64::from(level);
    }
    Ok(1.0 + percent / 100.0)
}

/// Biome multiplier for a resource: `1 + biome_percent / 100`.
pub fn biome_boost(config: &GameConfig, biome: &str, resource: ResourceKind) -> Result<f64> {
    Ok(1.0 + config.biome(biome)?.percent_for(resource) / 100.0)
}

// ============================================================================
// Per-structure formulas
// ============================================================================

/// Hourly production of a structure at `level` on `planet`.
///
/// Structures without a production resource report zero metal.
pub fn structure_hourly_production(
    config: &GameConfig,
    planet: &Planet,
    research: &ResearchLevels,
    structure_type: &str,
    level: u32,
) -> Result<(ResourceKind, f64)> {
    let structure = config.structure(structure_type)?;
    let Some((resource, spec)) = structure
        .production
        .and_then(|spec| spec.resource.map(|resource| (resource, spec)))
    else {
        return Ok((ResourceKind::Metal, 0.0));
    };

    let per_second = (spec.base + spec.per_level * f64::from(level))
        * research_boost(config, research, resource)?
        * biome_boost(config, &planet.biome, resource)?
        * config.speed().resources;

    Ok((resource, per_second * SECONDS_PER_HOUR))
}

/// Energy drawn by a structure at `level`.
pub fn structure_energy_consumption(
    config: &GameConfig,
    structure_type: &str,
    level: u32,
) -> Result<f64> {
    Ok(config
        .structure(structure_type)?
        .energy_consumption
        .map_or(0.0, |rate| rate.at(level)))
}

/// Energy generated by a structure at `level`.
///
/// Zero for every type other than [`ENERGY_STRUCTURE_TYPE`].
pub fn structure_energy_production(
    config: &GameConfig,
    structure_type: &str,
    level: u32,
) -> Result<f64> {
    if structure_type != ENERGY_STRUCTURE_TYPE {
        return Ok(0.0);
    }
    Ok(config
        .structure(structure_type)?
        .energy_production
        .map_or(0.0, |rate| rate.at(level)))
}

/// Storage cap a structure provides at `level`, `None` without a storage role.
pub fn structure_storage_capacity(
    config: &GameConfig,
    structure_type: &str,
    level: u32,
) -> Result<Option<(ResourceKind, f64)>> {
    Ok(config.structure(structure_type)?.storage.map(|storage| {
        (
            storage.resource,
            storage.base + storage.per_level * f64::from(level),
        )
    }))
}

// ============================================================================
// Costs and durations
// ============================================================================

/// Cost of one level, floored to a multiple of 10.
///
/// - linear (`per_level` set): `(base + per_level * level) * reduction_coef`
/// - exponential (`power` set): `(base * level) ^ power * reduction_coef`
/// - flat: `base * reduction_coef`
#[must_use]
pub fn upgrade_structure_cost(
    base: f64,
    per_level: Option<f64>,
    power: Option<f64>,
    level: u32,
    reduction_coef: f64,
) -> u64 {
    let curve = CostCurve {
        base,
        per_level,
        power,
    };
    let scaled = curve.raw_at(level) * reduction_coef;
    if !scaled.is_finite() || scaled <= 0.0 {
        return 0;
    }
    ((scaled / 10.0).floor() * 10.0) as u64
}

/// Levels gained by raising `current_level` by `levels_to_add`.
fn upgrade_levels(current_level: u32, levels_to_add: u32) -> RangeInclusive<u32> {
    current_level.saturating_add(1)..=current_level.saturating_add(levels_to_add)
}

/// Advisory affordability check for a structure upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCheck {
    /// Whether the planet can pay.
    pub allowed: bool,
    /// Total metal cost of the requested levels.
    pub metal_cost: u64,
    /// Why the upgrade is refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Check whether `planet` can pay for `levels_to_add` levels above `current_level`.
///
/// Sums the cost of every level in `[current_level + 1, current_level + levels_to_add]`.
/// Pure: nothing is deducted or reserved.
pub fn can_upgrade_structure(
    config: &GameConfig,
    planet: &Planet,
    structure_type: &str,
    current_level: u32,
    levels_to_add: u32,
) -> Result<UpgradeCheck> {
    let curve = config.structure(structure_type)?.cost;
    let metal_cost: u64 = upgrade_levels(current_level, levels_to_add)
        .map(|level| curve.cost_at(level, 1.0))
        .sum();

    let available = planet.resources.metal;
    if (metal_cost as f64) > available {
        return Ok(UpgradeCheck {
            allowed: false,
            metal_cost,
            reason: Some(format!(
                "Insufficient metal: need {metal_cost}, have {}",
                available.floor()
            )),
        });
    }

    Ok(UpgradeCheck {
        allowed: true,
        metal_cost,
        reason: None,
    })
}

/// Seconds needed to raise a structure by `levels_to_add` levels.
///
/// Each level takes at least one second.
pub fn upgrade_structure_duration(
    config: &GameConfig,
    structure_type: &str,
    current_level: u32,
    levels_to_add: u32,
) -> Result<u64> {
    let curve = config.structure(structure_type)?.build_time;
    Ok(upgrade_levels(current_level, levels_to_add)
        .map(|level| {
            let secs = curve.raw_at(level);
            if secs.is_finite() {
                (secs.ceil() as u64).max(1)
            } else {
                1
            }
        })
        .sum())
}

// ============================================================================
// Planet aggregates
// ============================================================================

/// Energy produced and consumed across a planet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Energy generated.
    pub produced: f64,
    /// Energy demanded.
    pub consumed: f64,
}

impl EnergyBalance {
    /// Production minus consumption.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.produced - self.consumed
    }

    /// Fraction of demand that is met, in `[0, 1]`.
    #[must_use]
    pub fn efficiency(&self) -> f64 {
        if self.consumed <= 0.0 {
            1.0
        } else {
            (self.produced / self.consumed).clamp(0.0, 1.0)
        }
    }
}

/// Energy balance of a planet at its current structure levels and throttles.
pub fn planet_energy_balance(config: &GameConfig, planet: &Planet) -> Result<EnergyBalance> {
    let mut balance = EnergyBalance::default();
    for structure in &planet.structures {
        let rate = structure.rate_factor();
        balance.produced +=
            structure_energy_production(config, &structure.structure_type, structure.level)?
                * rate;
        balance.consumed +=
            structure_energy_consumption(config, &structure.structure_type, structure.level)?
                * rate;
    }
    Ok(balance)
}

/// Per-second production of every stockpiled resource on a planet.
///
/// Each structure is scaled by its throttle and by the planet's energy efficiency.
pub fn planet_production_per_second(
    config: &GameConfig,
    planet: &Planet,
    research: &ResearchLevels,
) -> Result<ResourceBundle> {
    let efficiency = planet_energy_balance(config, planet)?.efficiency();
    let mut rates = ResourceBundle::ZERO;

    for structure in &planet.structures {
        let (resource, hourly) = structure_hourly_production(
            config,
            planet,
            research,
            &structure.structure_type,
            structure.level,
        )?;
        let per_second = hourly / SECONDS_PER_HOUR * structure.rate_factor() * efficiency;
        match resource {
            ResourceKind::Metal => rates.metal += per_second,
            ResourceKind::Deuterium => rates.deuterium += per_second,
            ResourceKind::Microchips => rates.microchips += per_second,
            // Rejected at config validation
            ResourceKind::Energy => {}
        }
    }

    Ok(rates)
}

/// Storage caps of a planet. Resources without a storage structure are uncapped.
pub fn planet_storage_capacities(
    config: &GameConfig,
    planet: &Planet,
) -> Result<BTreeMap<ResourceKind, f64>> {
    let mut caps = BTreeMap::new();
    for structure in &planet.structures {
        if let Some((resource, cap)) =
            structure_storage_capacity(config, &structure.structure_type, structure.level)?
        {
            *caps.entry(resource).or_insert(0.0) += cap;
        }
    }
    Ok(caps)
}

// ============================================================================
// Advancing planet state
// ============================================================================

/// A structure upgrade applied while advancing a planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedUpgrade {
    /// Structure type.
    pub structure_type: String,
    /// Level after the upgrade.
    pub level: u32,
    /// When the upgrade completed.
    pub finished_at: Timestamp,
}

/// Apply production from `last_update` up to `now` and complete due upgrades.
///
/// Calling this twice with the same `now` changes nothing the second time; a
/// `now` earlier than `last_update` is ignored.
pub fn advance_planet(
    config: &GameConfig,
    planet: &mut Planet,
    research: &ResearchLevels,
    now: Timestamp,
) -> Result<Vec<CompletedUpgrade>> {
    let mut completed = Vec::new();
    let mut cursor = planet.resources.last_update;
    if now < cursor {
        tracing::warn!(
            planet = %planet.id,
            last_update = %cursor,
            now = %now,
            "Ignoring advance to an instant before last update"
        );
        return Ok(completed);
    }

    loop {
        let next_finish = planet
            .structures
            .iter()
            .filter_map(|s| s.construction.map(|w| w.finish))
            .filter(|finish| *finish <= now)
            .min();

        let segment_end = next_finish.map_or(now, |finish| finish.max(cursor));
        accrue(config, planet, research, cursor, segment_end)?;
        cursor = segment_end;

        if next_finish.is_none() {
            break;
        }
        for structure in &mut planet.structures {
            if let Some(window) = structure.construction.filter(|w| w.finish <= cursor) {
                structure.level += window.levels_to_add;
                structure.construction = None;
                tracing::debug!(
                    planet = %planet.id,
                    structure = %structure.structure_type,
                    level = structure.level,
                    "Structure upgrade completed"
                );
                completed.push(CompletedUpgrade {
                    structure_type: structure.structure_type.clone(),
                    level: structure.level,
                    finished_at: window.finish,
                });
            }
        }
    }

    planet.resources.last_update = now;
    planet.resources.energy = planet_energy_balance(config, planet)?.net();
    Ok(completed)
}

/// Add production over `[from, to]` at the planet's current levels.
fn accrue(
    config: &GameConfig,
    planet: &mut Planet,
    research: &ResearchLevels,
    from: Timestamp,
    to: Timestamp,
) -> Result<()> {
    let secs = to.secs_since(from);
    if secs <= 0.0 {
        return Ok(());
    }

    let rates = planet_production_per_second(config, planet, research)?;
    let caps = planet_storage_capacities(config, planet)?;

    for kind in ResourceKind::STOCKPILED {
        let amount = planet.resources.get_mut(kind);
        let produced = rates.get(kind) * secs;
        match caps.get(&kind) {
            // Stock already above the cap is kept but does not grow
            Some(&cap) if *amount >= cap => {}
            Some(&cap) => *amount = (*amount + produced).min(cap),
            None => *amount += produced,
        }
        *amount = amount.max(0.0);
    }
    Ok(())
}

/// Outcome of a structure upgrade request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeStart {
    /// Metal was deducted and the construction window opened.
    Started {
        /// The opened window.
        window: ConstructionWindow,
        /// Metal deducted.
        metal_cost: u64,
    },
    /// The planet cannot pay; nothing changed.
    Rejected(UpgradeCheck),
}

/// Pay for and schedule a structure upgrade starting at `now`.
///
/// The planet should be advanced to `now` first so the metal check sees
/// up-to-date stock. A structure not yet built is created at level 0.
pub fn start_structure_upgrade(
    config: &GameConfig,
    planet: &mut Planet,
    structure_type: &str,
    levels_to_add: u32,
    now: Timestamp,
) -> Result<UpgradeStart> {
    if levels_to_add == 0 {
        return Err(EngineError::invalid("levels_to_add must be at least 1"));
    }
    config.structure(structure_type)?;
    if planet
        .structure(structure_type)
        .is_some_and(|s| s.is_upgrading())
    {
        return Err(EngineError::invalid(format!(
            "structure '{structure_type}' on planet '{}' is already upgrading",
            planet.id
        )));
    }

    let current_level = planet.structure_level(structure_type);
    let check =
        can_upgrade_structure(config, planet, structure_type, current_level, levels_to_add)?;
    if !check.allowed {
        return Ok(UpgradeStart::Rejected(check));
    }

    let duration =
        upgrade_structure_duration(config, structure_type, current_level, levels_to_add)?;
    let window = ConstructionWindow {
        start: now,
        finish: now.plus_secs(duration),
        levels_to_add,
    };

    planet.resources.metal -= check.metal_cost as f64;
    planet.structure_or_insert(structure_type).construction = Some(window);

    tracing::debug!(
        planet = %planet.id,
        structure = structure_type,
        levels_to_add,
        duration,
        "Structure upgrade started"
    );

    Ok(UpgradeStart::Started {
        window,
        metal_cost: check.metal_cost,
    })
}
