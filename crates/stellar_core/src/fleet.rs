//! Fleet travel and mission lifecycle.
//!
//! A movement is a convoy of ship types that moves at the speed of its
//! slowest member. Its lifecycle is driven purely by timestamps:
//!
//! ```text
//! traveling ──arrival──> returning ──return──> completed
//!     │                      ^
//!     └─(expedition)─> expeditioning ──end──┘
//! ```
//!
//! One-way missions complete at the destination. Mission effects (combat,
//! colonization, intel) belong to a [`MissionHandler`] supplied by the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{EngineError, Result};
use crate::planet::{DebrisField, Outpost, Planet, PlanetId, Position, UserId};
use crate::resources::ResourcePayload;
use crate::time::Timestamp;

/// Ship counts by type.
pub type ShipManifest = BTreeMap<String, u64>;

/// Speed used for a ship type missing from config.
pub const UNKNOWN_SHIP_SPEED: f64 = 1.0;

/// What a fleet was sent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    /// Carry resources to a planet and come back.
    Transport,
    /// Settle an unowned planet.
    Colonize,
    /// Fight whatever is at the destination.
    Attack,
    /// Gather intel.
    Spy,
    /// Salvage a debris field.
    Recycle,
    /// Hand ships and cargo over to a planet.
    Delivery,
    /// Relocate ships to another owned planet.
    Move,
    /// Explore an anomaly for a while.
    Expedition,
}

impl MissionType {
    /// Whether the fleet stays at the destination.
    #[must_use]
    pub const fn is_one_way(self) -> bool {
        matches!(self, Self::Colonize | Self::Delivery | Self::Move)
    }

    /// Whether cargo is handed over at the destination rather than kept aboard.
    #[must_use]
    pub const fn unloads_cargo(self) -> bool {
        matches!(
            self,
            Self::Transport | Self::Colonize | Self::Delivery | Self::Move
        )
    }
}

/// Status of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    /// On the way out.
    Traveling,
    /// Holding at an expedition target.
    Expeditioning,
    /// On the way back to the origin.
    Returning,
    /// Finished; ready to archive.
    Completed,
}

/// Kind of thing at a movement endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A planet, owned or not.
    #[default]
    Planet,
    /// A debris field.
    DebrisField,
    /// A trading outpost.
    Outpost,
    /// An anomaly with no backing entity.
    Anomaly,
}

/// Origin or destination of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Id of the planet, debris field or outpost here. A weak reference: lookup only.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Location.
    pub position: Position,
    /// Kind of target.
    #[serde(default)]
    pub target: TargetKind,
}

impl Endpoint {
    /// Endpoint at a planet.
    #[must_use]
    pub fn planet(planet: &Planet) -> Self {
        Self {
            target_id: Some(planet.id.clone()),
            position: planet.position,
            target: TargetKind::Planet,
        }
    }

    /// Endpoint at a debris field.
    #[must_use]
    pub fn debris(field: &DebrisField) -> Self {
        Self {
            target_id: Some(field.id.clone()),
            position: field.position,
            target: TargetKind::DebrisField,
        }
    }

    /// Endpoint at a trading outpost.
    #[must_use]
    pub fn outpost(outpost: &Outpost) -> Self {
        Self {
            target_id: Some(outpost.id.clone()),
            position: outpost.position,
            target: TargetKind::Outpost,
        }
    }

    /// Planet id, when the endpoint is a planet.
    #[must_use]
    pub fn planet_id(&self) -> Option<&PlanetId> {
        match self.target {
            TargetKind::Planet => self.target_id.as_ref(),
            _ => None,
        }
    }

    /// Endpoint at a bare position.
    #[must_use]
    pub const fn at(position: Position, target: TargetKind) -> Self {
        Self {
            target_id: None,
            position,
            target,
        }
    }
}

/// A fleet in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetMovement {
    /// Unique id.
    pub id: String,
    /// Dispatching user.
    pub owner: UserId,
    /// Ships in the convoy.
    pub ships: ShipManifest,
    /// Where the fleet left from and returns to.
    pub origin: Endpoint,
    /// Where the fleet is headed.
    pub destination: Endpoint,
    /// Mission.
    pub mission: MissionType,
    /// When the outbound leg started.
    pub departure_time: Timestamp,
    /// When the fleet reaches the destination.
    pub arrival_time: Timestamp,
    /// One-way travel time.
    pub travel_seconds: u64,
    /// How long an expedition holds at its target.
    #[serde(default)]
    pub expedition_seconds: u64,
    /// When the expedition ends, once expeditioning.
    #[serde(default)]
    pub expedition_end_time: Option<Timestamp>,
    /// When the fleet gets back, once returning.
    #[serde(default)]
    pub return_time: Option<Timestamp>,
    /// Current status.
    pub status: MovementStatus,
    /// Cargo aboard.
    #[serde(default)]
    pub payload: Option<ResourcePayload>,
}

impl FleetMovement {
    /// Total ships aboard.
    #[must_use]
    pub fn ship_count(&self) -> u64 {
        self.ships.values().sum()
    }

    /// Whether the movement is finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == MovementStatus::Completed
    }

    /// Next instant at which this movement changes status.
    #[must_use]
    pub fn next_transition(&self) -> Option<Timestamp> {
        match self.status {
            MovementStatus::Traveling => Some(self.arrival_time),
            MovementStatus::Expeditioning => self.expedition_end_time,
            MovementStatus::Returning => self.return_time,
            MovementStatus::Completed => None,
        }
    }

    fn begin_return(&mut self, from: Timestamp, loot: Option<ResourcePayload>) {
        self.payload = match (self.payload.take(), loot) {
            (Some(aboard), Some(loot)) => Some(aboard + loot),
            (aboard, loot) => aboard.or(loot),
        };
        self.return_time = Some(from.plus_secs(self.travel_seconds));
        self.status = MovementStatus::Returning;
    }

    fn apply_losses(&mut self, losses: &ShipManifest) {
        for (ship_type, lost) in losses {
            if let Some(count) = self.ships.get_mut(ship_type) {
                *count = count.saturating_sub(*lost);
            }
        }
        self.ships.retain(|_, count| *count > 0);
    }
}

// ============================================================================
// Travel time
// ============================================================================

/// Speed of the slowest ship type present in the convoy.
///
/// Types missing from config count as [`UNKNOWN_SHIP_SPEED`].
pub fn slowest_speed(config: &GameConfig, ships: &ShipManifest) -> Result<f64> {
    let mut present = ships.iter().filter(|(_, count)| **count > 0).peekable();
    if present.peek().is_none() {
        return Err(EngineError::invalid("convoy has no ships"));
    }

    Ok(present
        .map(|(ship_type, _)| match config.find_ship(ship_type) {
            Some(ship) => ship.speed,
            None => {
                tracing::warn!(ship_type = %ship_type, "Unknown ship type, using minimum speed");
                UNKNOWN_SHIP_SPEED
            }
        })
        .fold(f64::INFINITY, f64::min))
}

/// Arrival time and travel seconds for a convoy leaving at `now`.
///
/// Travel always takes at least one second, even between identical positions.
pub fn calculate_fleet_arrival_time(
    config: &GameConfig,
    ships: &ShipManifest,
    origin: Position,
    destination: Position,
    now: Timestamp,
) -> Result<(Timestamp, u64)> {
    let slowest = slowest_speed(config, ships)?;
    let distance = origin.distance(destination);
    let secs = (distance / slowest / config.speed().ships).ceil();
    if !secs.is_finite() {
        return Err(EngineError::invalid(format!(
            "travel time from {origin} to {destination} is not finite"
        )));
    }

    let travel_seconds = (secs as u64).max(1);
    Ok((now.plus_secs(travel_seconds), travel_seconds))
}

/// Total cargo capacity of a convoy.
pub fn convoy_capacity(config: &GameConfig, ships: &ShipManifest) -> Result<f64> {
    ships.iter().try_fold(0.0, |total, (ship_type, count)| {
        Ok(total + config.ship(ship_type)?.capacity * *count as f64)
    })
}

/// Salvage a recycler convoy with `free_capacity` can take from `debris`.
///
/// Fills metal first, then deuterium, then microchips. The debris field is
/// not modified; the caller subtracts the returned bundle.
#[must_use]
pub fn collect_debris(debris: &DebrisField, free_capacity: f64) -> ResourcePayload {
    let mut room = free_capacity.max(0.0);
    let mut take = |available: f64| {
        let taken = available.max(0.0).min(room);
        room -= taken;
        taken
    };
    let metal = take(debris.resources.metal);
    let deuterium = take(debris.resources.deuterium);
    let microchips = take(debris.resources.microchips);
    ResourcePayload::new(metal, deuterium, microchips)
}

// ============================================================================
// Dispatch
// ============================================================================

/// A request to send ships from a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetOrder {
    /// Id for the new movement.
    pub id: String,
    /// Dispatching user.
    pub owner: UserId,
    /// Ships to send.
    pub ships: ShipManifest,
    /// Target.
    pub destination: Endpoint,
    /// Mission.
    pub mission: MissionType,
    /// Cargo to load from the origin planet.
    #[serde(default)]
    pub payload: Option<ResourcePayload>,
    /// Hold time for expeditions.
    #[serde(default)]
    pub expedition_seconds: Option<u64>,
}

/// Launch a fleet from `origin` at `now`.
///
/// Ships and cargo are removed from the origin planet.
pub fn dispatch(
    config: &GameConfig,
    origin: &mut Planet,
    order: FleetOrder,
    now: Timestamp,
) -> Result<FleetMovement> {
    let (arrival_time, travel_seconds) = calculate_fleet_arrival_time(
        config,
        &order.ships,
        origin.position,
        order.destination.position,
        now,
    )?;

    for (ship_type, &count) in &order.ships {
        let stationed = origin.ships_of(ship_type);
        if stationed < count {
            return Err(EngineError::invalid(format!(
                "planet '{}' has {stationed} {ship_type}, {count} requested",
                origin.id
            )));
        }
    }

    let expedition_seconds = match (order.mission, order.expedition_seconds) {
        (MissionType::Expedition, Some(secs)) if secs > 0 => secs,
        (MissionType::Expedition, _) => {
            return Err(EngineError::invalid("expedition requires a hold time"));
        }
        _ => 0,
    };

    let payload = order.payload.filter(|p| !p.is_empty());
    if let Some(cargo) = &payload {
        if !cargo.is_valid() {
            return Err(EngineError::invalid("cargo amounts must be non-negative"));
        }
        let capacity = convoy_capacity(config, &order.ships)?;
        if cargo.total() > capacity {
            return Err(EngineError::invalid(format!(
                "cargo {} exceeds convoy capacity {capacity}",
                cargo.total()
            )));
        }
        if !origin.resources.spend(cargo) {
            return Err(EngineError::invalid(format!(
                "planet '{}' cannot supply the requested cargo",
                origin.id
            )));
        }
    }

    for (ship_type, &count) in &order.ships {
        if let Some(stationed) = origin.hangar.get_mut(ship_type) {
            *stationed -= count;
        }
    }
    origin.hangar.retain(|_, count| *count > 0);

    tracing::debug!(
        movement = %order.id,
        mission = ?order.mission,
        from = %origin.position,
        to = %order.destination.position,
        travel_seconds,
        "Fleet dispatched"
    );

    Ok(FleetMovement {
        id: order.id,
        owner: order.owner,
        ships: order.ships.into_iter().filter(|(_, n)| *n > 0).collect(),
        origin: Endpoint::planet(origin),
        destination: order.destination,
        mission: order.mission,
        departure_time: now,
        arrival_time,
        travel_seconds,
        expedition_seconds,
        expedition_end_time: None,
        return_time: None,
        status: MovementStatus::Traveling,
        payload,
    })
}

/// Turn a fleet around at `now`.
///
/// An outbound fleet flies back for as long as it has been out; an
/// expedition leaves its target early.
pub fn recall(movement: &mut FleetMovement, now: Timestamp) -> Result<()> {
    match movement.status {
        MovementStatus::Traveling if now < movement.arrival_time => {
            let elapsed = now.millis_since(movement.departure_time);
            movement.return_time = Some(Timestamp::from_millis(now.as_millis() + elapsed.max(1)));
            movement.status = MovementStatus::Returning;
            Ok(())
        }
        MovementStatus::Expeditioning => {
            movement.begin_return(now, None);
            movement.expedition_end_time = Some(now);
            Ok(())
        }
        status => Err(EngineError::invalid(format!(
            "movement '{}' cannot be recalled while {status:?}",
            movement.id
        ))),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Result of a mission effect, decided by the caller's handler.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrivalOutcome {
    /// Ships destroyed.
    #[serde(default)]
    pub losses: ShipManifest,
    /// Resources taken aboard for the return leg.
    #[serde(default)]
    pub loot: Option<ResourcePayload>,
}

/// Applies mission effects at the destination.
///
/// Implemented by the game service: combat, colonization, intel and
/// resource delivery all live behind this trait.
pub trait MissionHandler {
    /// Apply the mission effect of `movement`.
    ///
    /// `cargo` is the payload handed over at the destination for missions
    /// that unload; `None` otherwise.
    fn on_arrival(
        &mut self,
        movement: &FleetMovement,
        at: Timestamp,
        cargo: Option<ResourcePayload>,
    ) -> Result<ArrivalOutcome>;
}

/// Handler with no effects: nothing is lost and nothing is looted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveMissionHandler;

impl MissionHandler for PassiveMissionHandler {
    fn on_arrival(
        &mut self,
        _movement: &FleetMovement,
        _at: Timestamp,
        _cargo: Option<ResourcePayload>,
    ) -> Result<ArrivalOutcome> {
        Ok(ArrivalOutcome::default())
    }
}

/// A status transition produced by [`resolve_movement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MovementEvent {
    /// The fleet reached its destination.
    Arrived {
        /// Arrival instant.
        at: Timestamp,
        /// Cargo handed over.
        delivered: Option<ResourcePayload>,
    },
    /// An expedition finished exploring.
    ExpeditionEnded {
        /// End instant.
        at: Timestamp,
    },
    /// Every ship was lost.
    Destroyed {
        /// Instant of the loss.
        at: Timestamp,
    },
    /// A one-way fleet joined the destination.
    Stationed {
        /// Arrival instant.
        at: Timestamp,
        /// Ships now at the destination.
        ships: ShipManifest,
    },
    /// The fleet is back at its origin.
    Returned {
        /// Return instant.
        at: Timestamp,
        /// Ships back home.
        ships: ShipManifest,
        /// Cargo brought home.
        cargo: Option<ResourcePayload>,
    },
}

/// Apply every transition due at or before `now`, in order.
///
/// All transitions of one call are evaluated against the same `now`.
pub fn resolve_movement(
    movement: &mut FleetMovement,
    now: Timestamp,
    handler: &mut dyn MissionHandler,
) -> Result<Vec<MovementEvent>> {
    let mut events = Vec::new();

    loop {
        match movement.status {
            MovementStatus::Traveling if now >= movement.arrival_time => {
                let at = movement.arrival_time;
                if movement.mission == MissionType::Expedition {
                    movement.status = MovementStatus::Expeditioning;
                    movement.expedition_end_time =
                        Some(at.plus_secs(movement.expedition_seconds));
                    events.push(MovementEvent::Arrived {
                        at,
                        delivered: None,
                    });
                    continue;
                }

                let cargo = if movement.mission.unloads_cargo() {
                    movement.payload
                } else {
                    None
                };
                // Cargo stays aboard until the handler accepts the arrival
                let outcome = handler.on_arrival(movement, at, cargo)?;
                if cargo.is_some() {
                    movement.payload = None;
                }
                events.push(MovementEvent::Arrived {
                    at,
                    delivered: cargo,
                });
                tracing::debug!(
                    movement = %movement.id,
                    mission = ?movement.mission,
                    "Fleet arrived"
                );

                if finish_effect(movement, at, outcome, &mut events) {
                    break;
                }
            }
            MovementStatus::Expeditioning => {
                let Some(at) = movement.expedition_end_time.filter(|end| now >= *end) else {
                    break;
                };
                let outcome = handler.on_arrival(movement, at, None)?;
                events.push(MovementEvent::ExpeditionEnded { at });
                if finish_effect(movement, at, outcome, &mut events) {
                    break;
                }
            }
            MovementStatus::Returning => {
                let Some(at) = movement.return_time.filter(|back| now >= *back) else {
                    break;
                };
                movement.status = MovementStatus::Completed;
                tracing::debug!(movement = %movement.id, "Fleet returned");
                events.push(MovementEvent::Returned {
                    at,
                    ships: movement.ships.clone(),
                    cargo: movement.payload.take(),
                });
                break;
            }
            MovementStatus::Traveling | MovementStatus::Completed => break,
        }
    }

    Ok(events)
}

/// Apply a mission outcome. Returns `true` when the movement completed.
fn finish_effect(
    movement: &mut FleetMovement,
    at: Timestamp,
    outcome: ArrivalOutcome,
    events: &mut Vec<MovementEvent>,
) -> bool {
    movement.apply_losses(&outcome.losses);
    if movement.ships.is_empty() {
        movement.status = MovementStatus::Completed;
        movement.payload = None;
        events.push(MovementEvent::Destroyed { at });
        return true;
    }

    if movement.mission.is_one_way() {
        movement.status = MovementStatus::Completed;
        events.push(MovementEvent::Stationed {
            at,
            ships: movement.ships.clone(),
        });
        return true;
    }

    movement.begin_return(at, outcome.loot);
    false
}
