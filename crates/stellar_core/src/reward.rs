//! Reward payloads, user inventory and player-facing reports.
//!
//! Payloads are tagged unions stored as `{"type": ..., "data": ...}`.

use serde::{Deserialize, Serialize};

use crate::fleet::{FleetMovement, MissionType, MovementEvent, ShipManifest};
use crate::planet::UserId;
use crate::progression::User;
use crate::queue::{FacilityKind, QueueResolution};
use crate::resources::{ResourceBundle, ResourcePayload};
use crate::ship_generator::{Ship, ShipBlueprint, ShipComponent};
use crate::time::Timestamp;

/// Items a user holds outside of planets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInventory {
    /// Owner.
    pub user_id: UserId,
    /// Banked resources.
    pub resources: ResourceBundle,
    /// Unused blueprints.
    pub blueprints: Vec<ShipBlueprint>,
    /// Uninstalled components.
    pub components: Vec<ShipComponent>,
    /// Individually tracked ships.
    pub ships: Vec<Ship>,
}

impl UserInventory {
    /// Empty inventory for a user.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Remove and return a blueprint.
    pub fn take_blueprint(&mut self, id: &str) -> Option<ShipBlueprint> {
        let index = self.blueprints.iter().position(|b| b.id == id)?;
        Some(self.blueprints.remove(index))
    }

    /// Remove and return every listed component, or none of them if one is missing.
    pub fn take_components(&mut self, ids: &[String]) -> Option<Vec<ShipComponent>> {
        let mut remaining = self.components.clone();
        let mut taken = Vec::with_capacity(ids.len());
        for id in ids {
            let index = remaining.iter().position(|c| &c.id == id)?;
            taken.push(remaining.remove(index));
        }
        self.components = remaining;
        Some(taken)
    }
}

/// Something granted to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RewardPayload {
    /// Resources banked in the inventory.
    Resources(ResourceBundle),
    /// A ship blueprint.
    Blueprint(ShipBlueprint),
    /// A ship component.
    Component(ShipComponent),
    /// A finished ship.
    Ship(Ship),
    /// Reputation points.
    Reputation {
        /// Points granted.
        points: i64,
    },
}

impl RewardPayload {
    /// One-line description for mail subjects.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Resources(bundle) => format!(
                "{:.0} metal, {:.0} deuterium, {:.0} microchips",
                bundle.metal, bundle.deuterium, bundle.microchips
            ),
            Self::Blueprint(blueprint) => {
                format!("{:?} {} blueprint", blueprint.rarity, blueprint.ship_type)
            }
            Self::Component(component) => {
                format!("{:?} component {}", component.rarity, component.id)
            }
            Self::Ship(ship) => format!("{:?} ship {}", ship.rarity, ship.name),
            Self::Reputation { points } => format!("{points} reputation"),
        }
    }

    /// Credit the reward. Returns reputation levels gained.
    pub fn grant(self, user: &mut User, inventory: &mut UserInventory) -> u32 {
        match self {
            Self::Resources(bundle) => {
                inventory.resources += bundle;
                0
            }
            Self::Blueprint(blueprint) => {
                inventory.blueprints.push(blueprint);
                0
            }
            Self::Component(component) => {
                inventory.components.push(component);
                0
            }
            Self::Ship(ship) => {
                inventory.ships.push(ship);
                0
            }
            Self::Reputation { points } => user.award_reputation(points),
        }
    }
}

/// A report delivered to a player's mailbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Report {
    /// A fleet reached its target.
    FleetArrived {
        /// Movement id.
        movement_id: String,
        /// Mission flown.
        mission: MissionType,
        /// Arrival instant.
        at: Timestamp,
        /// Cargo handed over.
        delivered: Option<ResourcePayload>,
    },
    /// An expedition is over and heading home.
    ExpeditionEnded {
        /// Movement id.
        movement_id: String,
        /// End instant.
        at: Timestamp,
    },
    /// A fleet was wiped out.
    FleetLost {
        /// Movement id.
        movement_id: String,
        /// Mission flown.
        mission: MissionType,
        /// Instant of the loss.
        at: Timestamp,
    },
    /// Ships joined another planet.
    FleetStationed {
        /// Movement id.
        movement_id: String,
        /// Arrival instant.
        at: Timestamp,
        /// Ships delivered.
        ships: ShipManifest,
    },
    /// A fleet came home.
    FleetReturned {
        /// Movement id.
        movement_id: String,
        /// Return instant.
        at: Timestamp,
        /// Surviving ships.
        ships: ShipManifest,
        /// Cargo unloaded at home.
        cargo: Option<ResourcePayload>,
    },
    /// Units left a shipyard or defense factory.
    ConstructionFinished {
        /// Facility.
        kind: FacilityKind,
        /// Unit type.
        item_type: String,
        /// Units finished.
        count: u64,
    },
}

impl Report {
    /// Report for a movement transition.
    #[must_use]
    pub fn from_movement_event(movement: &FleetMovement, event: &MovementEvent) -> Self {
        let movement_id = movement.id.clone();
        match event {
            MovementEvent::Arrived { at, delivered } => Self::FleetArrived {
                movement_id,
                mission: movement.mission,
                at: *at,
                delivered: *delivered,
            },
            MovementEvent::ExpeditionEnded { at } => Self::ExpeditionEnded {
                movement_id,
                at: *at,
            },
            MovementEvent::Destroyed { at } => Self::FleetLost {
                movement_id,
                mission: movement.mission,
                at: *at,
            },
            MovementEvent::Stationed { at, ships } => Self::FleetStationed {
                movement_id,
                at: *at,
                ships: ships.clone(),
            },
            MovementEvent::Returned { at, ships, cargo } => Self::FleetReturned {
                movement_id,
                at: *at,
                ships: ships.clone(),
                cargo: *cargo,
            },
        }
    }

    /// One report per unit type finished.
    #[must_use]
    pub fn from_queue_resolution(resolution: &QueueResolution) -> Vec<Self> {
        resolution
            .completed
            .iter()
            .map(|item| Self::ConstructionFinished {
                kind: resolution.kind,
                item_type: item.item_type.clone(),
                count: item.count,
            })
            .collect()
    }

    /// Mail subject line.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::FleetArrived { mission, .. } => format!("Fleet arrived ({mission:?})"),
            Self::ExpeditionEnded { .. } => "Expedition complete".to_string(),
            Self::FleetLost { mission, .. } => format!("Fleet lost ({mission:?})"),
            Self::FleetStationed { ships, .. } => {
                format!("{} ships stationed", ships.values().sum::<u64>())
            }
            Self::FleetReturned { .. } => "Fleet returned".to_string(),
            Self::ConstructionFinished {
                item_type, count, ..
            } => format!("{count} x {item_type} completed"),
        }
    }
}
