//! Shipyard and defense-factory construction queues.
//!
//! Queues store schedule data only. A command's units are built in batches
//! of up to `slots` parallel items, each batch taking `unit_seconds`.
//! Resolution is pull-based: [`resolve`] compares `now` against the stored
//! timestamps and reports what finished since the previous resolution.
//!
//! Commands process strictly in insertion order; the `completed` counter on
//! each command guarantees a unit is never reported twice.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{EngineError, Result};
use crate::planet::Planet;
use crate::resources::ResourceCost;
use crate::time::{Timestamp, MILLIS_PER_SECOND};

/// Facility a queue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    /// Builds ships into the planet hangar.
    Shipyard,
    /// Builds planetary defenses.
    DefenseFactory,
}

impl FacilityKind {
    /// Per-unit cost and build time of an item this facility builds.
    pub fn unit_spec(self, config: &GameConfig, item_type: &str) -> Result<(ResourceCost, u64)> {
        match self {
            Self::Shipyard => {
                let ship = config.ship(item_type)?;
                Ok((ship.cost, ship.build_time))
            }
            Self::DefenseFactory => {
                let defense = config.defense(item_type)?;
                Ok((defense.cost, defense.build_time))
            }
        }
    }
}

/// Lifecycle state of a queued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// Waiting for earlier commands.
    Queued,
    /// Actively building.
    Current,
    /// All units built.
    Finished,
}

/// A request to build `count` units of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCommand {
    /// Ship or defense type key.
    pub item_type: String,
    /// Units requested.
    pub count: u64,
    /// Build time of one batch, in seconds.
    pub unit_seconds: u64,
    /// Parallel item slots when the command was admitted.
    pub slots: u32,
    /// When the first batch starts.
    pub construction_start_time: Timestamp,
    /// When the last batch finishes.
    pub construction_finish_time: Timestamp,
    /// Start of the batch in progress.
    pub current_item_start_time: Timestamp,
    /// Finish of the batch in progress.
    pub current_item_finish_time: Timestamp,
    /// Units already reported as built.
    #[serde(default)]
    pub completed: u64,
}

impl QueueCommand {
    fn batch_millis(&self) -> i64 {
        (self.unit_seconds.max(1) as i64).saturating_mul(MILLIS_PER_SECOND)
    }

    /// State of this command at `now`.
    #[must_use]
    pub fn state(&self, now: Timestamp) -> CommandState {
        if now >= self.construction_finish_time {
            CommandState::Finished
        } else if now >= self.construction_start_time {
            CommandState::Current
        } else {
            CommandState::Queued
        }
    }

    /// Units finished by `now`.
    #[must_use]
    pub fn built_by(&self, now: Timestamp) -> u64 {
        match self.state(now) {
            CommandState::Finished => self.count,
            CommandState::Queued => 0,
            CommandState::Current => {
                let batches = now.millis_since(self.construction_start_time) / self.batch_millis();
                (batches as u64)
                    .saturating_mul(u64::from(self.slots.max(1)))
                    .min(self.count)
            }
        }
    }

    /// Move the current-item window onto the batch running at `now`.
    fn track_batch(&mut self, now: Timestamp) {
        if self.state(now) != CommandState::Current {
            return;
        }
        let batch = now.millis_since(self.construction_start_time) / self.batch_millis();
        let start = Timestamp::from_millis(
            self.construction_start_time.as_millis() + batch * self.batch_millis(),
        );
        self.current_item_start_time = start;
        self.current_item_finish_time =
            Timestamp::from_millis(start.as_millis() + self.batch_millis())
                .min(self.construction_finish_time);
    }
}

/// A planet's construction queue for one facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionQueue {
    /// Facility this queue belongs to.
    pub kind: FacilityKind,
    /// Parallel item slots for new commands.
    pub capacity: u32,
    /// Commands in insertion order; the front one is current.
    pub commands: VecDeque<QueueCommand>,
    /// Start of the front command.
    pub queue_start_time: Timestamp,
    /// Finish of the last command.
    pub queue_finish_time: Timestamp,
}

impl ConstructionQueue {
    /// Default parallel item slots.
    pub const DEFAULT_CAPACITY: u32 = 1;

    /// Create an empty queue with timestamps at `now`.
    #[must_use]
    pub fn new(kind: FacilityKind, now: Timestamp) -> Self {
        Self {
            kind,
            capacity: Self::DEFAULT_CAPACITY,
            commands: VecDeque::new(),
            queue_start_time: now,
            queue_finish_time: now,
        }
    }

    /// Create an empty queue with a specific capacity.
    #[must_use]
    pub fn with_capacity(kind: FacilityKind, capacity: u32, now: Timestamp) -> Self {
        Self {
            capacity: capacity.max(1),
            ..Self::new(kind, now)
        }
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get the number of commands in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// The command being built.
    #[must_use]
    pub fn current(&self) -> Option<&QueueCommand> {
        self.commands.front()
    }
}

/// Result of a construction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Admission {
    /// Resources were deducted and the command was appended.
    Accepted {
        /// Total cost paid.
        cost: ResourceCost,
        /// When the command starts.
        start: Timestamp,
        /// When the command finishes.
        finish: Timestamp,
    },
    /// The planet cannot pay; queue and planet are unchanged.
    Rejected {
        /// Why the request was refused.
        reason: String,
        /// Total cost that could not be paid.
        cost: ResourceCost,
    },
}

impl Admission {
    /// Whether the command was queued.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Pay for and queue `count` units of `item_type`.
///
/// The command starts when the previous one finishes, or at `now` if the
/// queue is idle.
pub fn enqueue(
    config: &GameConfig,
    queue: &mut ConstructionQueue,
    planet: &mut Planet,
    item_type: &str,
    count: u64,
    now: Timestamp,
) -> Result<Admission> {
    if count == 0 {
        return Err(EngineError::invalid("construction count must be at least 1"));
    }

    let (unit_cost, build_time) = queue.kind.unit_spec(config, item_type)?;

    let slots = queue.capacity.max(1);
    let unit_seconds = build_time.max(1);
    let start = if queue.is_empty() {
        now
    } else {
        queue.queue_finish_time.max(now)
    };
    let batches = count.div_ceil(u64::from(slots));
    let finish = batches
        .checked_mul(unit_seconds)
        .and_then(|secs| start.checked_plus_secs(secs))
        .ok_or_else(|| {
            EngineError::invalid(format!(
                "{count} {item_type} cannot be scheduled: build time out of range"
            ))
        })?;

    let cost = unit_cost.times(count);
    if let Some((resource, missing)) = planet.resources.shortfall(&cost) {
        return Ok(Admission::Rejected {
            reason: format!("Insufficient {resource}: missing {}", missing.ceil()),
            cost,
        });
    }
    planet.resources.spend(&cost);

    if queue.is_empty() {
        queue.queue_start_time = start;
    }
    queue.queue_finish_time = finish;
    queue.commands.push_back(QueueCommand {
        item_type: item_type.to_string(),
        count,
        unit_seconds,
        slots,
        construction_start_time: start,
        construction_finish_time: finish,
        current_item_start_time: start,
        current_item_finish_time: start.plus_secs(unit_seconds).min(finish),
        completed: 0,
    });

    tracing::debug!(
        planet = %planet.id,
        facility = ?queue.kind,
        item = item_type,
        count,
        start = %start,
        finish = %finish,
        "Construction command queued"
    );

    Ok(Admission::Accepted {
        cost,
        start,
        finish,
    })
}

/// Units of one item type finished during a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedItems {
    /// Ship or defense type key.
    pub item_type: String,
    /// Units finished.
    pub count: u64,
}

/// Everything a resolution pass finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueResolution {
    /// Facility resolved.
    pub kind: FacilityKind,
    /// Finished units in queue order.
    pub completed: Vec<CompletedItems>,
}

impl QueueResolution {
    /// Whether nothing finished.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Total units finished.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.completed.iter().map(|c| c.count).sum()
    }

    /// Credit finished units to the planet's hangar or defenses.
    pub fn apply_to(&self, planet: &mut Planet) {
        let inventory = match self.kind {
            FacilityKind::Shipyard => &mut planet.hangar,
            FacilityKind::DefenseFactory => &mut planet.defenses,
        };
        for item in &self.completed {
            *inventory.entry(item.item_type.clone()).or_insert(0) += item.count;
        }
    }
}

/// Report units finished since the last resolution and drop finished commands.
pub fn resolve(queue: &mut ConstructionQueue, now: Timestamp) -> QueueResolution {
    let mut completed = Vec::new();

    while let Some(command) = queue.commands.front_mut() {
        let built = command.built_by(now);
        if built > command.completed {
            completed.push(CompletedItems {
                item_type: command.item_type.clone(),
                count: built - command.completed,
            });
            command.completed = built;
        }

        if built >= command.count {
            tracing::debug!(
                facility = ?queue.kind,
                item = %command.item_type,
                count = command.count,
                "Construction command finished"
            );
            queue.commands.pop_front();
            continue;
        }

        command.track_batch(now);
        break;
    }

    queue.queue_start_time = queue
        .current()
        .map_or(queue.queue_finish_time, |c| c.construction_start_time);

    QueueResolution {
        kind: queue.kind,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefenseConfig, GameConfigData, ShipConfig};
    use crate::planet::Position;
    use crate::resources::ResourceLedger;

    fn test_config() -> GameConfig {
        GameConfig::new(GameConfigData {
            version: 1,
            ships: vec![ShipConfig {
                id: "fighter".to_string(),
                name: String::new(),
                cost: ResourceCost::new(100.0, 10.0, 0.0),
                build_time: 10,
                speed: 10_000.0,
                capacity: 50.0,
            }],
            defenses: vec![DefenseConfig {
                id: "laser_turret".to_string(),
                name: String::new(),
                cost: ResourceCost::new(50.0, 0.0, 0.0),
                build_time: 5,
            }],
            ..Default::default()
        })
        .unwrap()
    }

    fn test_planet(metal: f64) -> Planet {
        Planet::new(
            "p1",
            Position::new(1, 1, 1),
            "barren",
            ResourceLedger::new(metal, 1000.0, 0.0, Timestamp::EPOCH),
        )
    }

    #[test]
    fn test_enqueue_schedules_back_to_back() {
        let config = test_config();
        let mut planet = test_planet(1000.0);
        let mut queue = ConstructionQueue::new(FacilityKind::Shipyard, Timestamp::EPOCH);
        let now = Timestamp::from_secs(100);

        let first = enqueue(&config, &mut queue, &mut planet, "fighter", 3, now).unwrap();
        assert_eq!(
            first,
            Admission::Accepted {
                cost: ResourceCost::new(300.0, 30.0, 0.0),
                start: now,
                finish: Timestamp::from_secs(130),
            }
        );

        let second = enqueue(&config, &mut queue, &mut planet, "fighter", 1, now).unwrap();
        assert!(matches!(
            second,
            Admission::Accepted { start, finish, .. }
                if start == Timestamp::from_secs(130) && finish == Timestamp::from_secs(140)
        ));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.queue_start_time, now);
        assert_eq!(queue.queue_finish_time, Timestamp::from_secs(140));
        assert_eq!(planet.resources.metal, 600.0);
    }

    #[test]
    fn test_enqueue_respects_capacity() {
        let config = test_config();
        let mut planet = test_planet(1000.0);
        let mut queue =
            ConstructionQueue::with_capacity(FacilityKind::Shipyard, 2, Timestamp::EPOCH);

        // 5 units, 2 at a time: 3 batches of 10s
        let admission =
            enqueue(&config, &mut queue, &mut planet, "fighter", 5, Timestamp::EPOCH).unwrap();
        assert!(matches!(
            admission,
            Admission::Accepted { finish, .. } if finish == Timestamp::from_secs(30)
        ));
    }

    #[test]
    fn test_enqueue_rejected_leaves_state() {
        let config = test_config();
        let mut planet = test_planet(150.0);
        let mut queue = ConstructionQueue::new(FacilityKind::Shipyard, Timestamp::EPOCH);
        let before = (planet.clone(), queue.clone());

        let admission =
            enqueue(&config, &mut queue, &mut planet, "fighter", 2, Timestamp::EPOCH).unwrap();
        let Admission::Rejected { reason, cost } = admission else {
            panic!("expected rejection");
        };
        assert!(reason.contains("metal"));
        assert_eq!(cost.metal, 200.0);
        assert_eq!((planet, queue), before);
    }

    #[test]
    fn test_enqueue_invalid_requests() {
        let config = test_config();
        let mut planet = test_planet(1000.0);
        let mut queue = ConstructionQueue::new(FacilityKind::DefenseFactory, Timestamp::EPOCH);

        assert!(matches!(
            enqueue(&config, &mut queue, &mut planet, "laser_turret", 0, Timestamp::EPOCH),
            Err(EngineError::InvalidInput(_))
        ));
        // Ships are not built in a defense factory
        assert!(matches!(
            enqueue(&config, &mut queue, &mut planet, "fighter", 1, Timestamp::EPOCH),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_enqueue_huge_count_is_rejected_without_side_effects() {
        let config = GameConfig::new(GameConfigData {
            version: 1,
            defenses: vec![DefenseConfig {
                id: "decoy".to_string(),
                name: String::new(),
                cost: ResourceCost::ZERO,
                build_time: 5,
            }],
            ..Default::default()
        })
        .unwrap();
        let mut planet = test_planet(1000.0);
        let mut queue = ConstructionQueue::new(FacilityKind::DefenseFactory, Timestamp::EPOCH);
        let before = (planet.clone(), queue.clone());

        let result = enqueue(
            &config,
            &mut queue,
            &mut planet,
            "decoy",
            u64::MAX / 4,
            Timestamp::EPOCH,
        );
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        assert_eq!((planet, queue), before);
    }

    #[test]
    fn test_resolve_partial_then_full() {
        let config = test_config();
        let mut planet = test_planet(1000.0);
        let mut queue =
            ConstructionQueue::with_capacity(FacilityKind::Shipyard, 2, Timestamp::EPOCH);
        enqueue(&config, &mut queue, &mut planet, "fighter", 5, Timestamp::EPOCH).unwrap();

        // Nothing done before the first batch finishes
        assert!(resolve(&mut queue, Timestamp::from_secs(9)).is_empty());

        // Two batches done at 25s
        let resolution = resolve(&mut queue, Timestamp::from_secs(25));
        assert_eq!(resolution.total_units(), 4);
        let current = queue.current().unwrap();
        assert_eq!(current.completed, 4);
        assert_eq!(current.current_item_start_time, Timestamp::from_secs(20));
        assert_eq!(current.current_item_finish_time, Timestamp::from_secs(30));
        assert!(current.current_item_finish_time <= queue.queue_finish_time);

        // Same instant again reports nothing new
        assert!(resolve(&mut queue, Timestamp::from_secs(25)).is_empty());

        let resolution = resolve(&mut queue, Timestamp::from_secs(30));
        assert_eq!(resolution.total_units(), 1);
        assert!(queue.is_empty());

        resolution.apply_to(&mut planet);
        assert_eq!(planet.ships_of("fighter"), 1);
    }

    #[test]
    fn test_resolve_in_insertion_order() {
        let config = test_config();
        let mut planet = test_planet(10_000.0);
        let mut queue = ConstructionQueue::new(FacilityKind::DefenseFactory, Timestamp::EPOCH);
        enqueue(&config, &mut queue, &mut planet, "laser_turret", 2, Timestamp::EPOCH).unwrap();
        enqueue(&config, &mut queue, &mut planet, "laser_turret", 1, Timestamp::EPOCH).unwrap();

        // First command ends at 10s, second at 15s
        let resolution = resolve(&mut queue, Timestamp::from_secs(100));
        assert_eq!(
            resolution.completed,
            vec![
                CompletedItems {
                    item_type: "laser_turret".to_string(),
                    count: 2
                },
                CompletedItems {
                    item_type: "laser_turret".to_string(),
                    count: 1
                },
            ]
        );
        resolution.apply_to(&mut planet);
        assert_eq!(planet.defenses.get("laser_turret"), Some(&3));
        assert!(planet.hangar.is_empty());
    }

    #[test]
    fn test_command_states() {
        let command = QueueCommand {
            item_type: "fighter".to_string(),
            count: 2,
            unit_seconds: 10,
            slots: 1,
            construction_start_time: Timestamp::from_secs(10),
            construction_finish_time: Timestamp::from_secs(30),
            current_item_start_time: Timestamp::from_secs(10),
            current_item_finish_time: Timestamp::from_secs(20),
            completed: 0,
        };
        assert_eq!(command.state(Timestamp::from_secs(5)), CommandState::Queued);
        assert_eq!(command.state(Timestamp::from_secs(10)), CommandState::Current);
        assert_eq!(command.built_by(Timestamp::from_secs(25)), 1);
        assert_eq!(command.state(Timestamp::from_secs(30)), CommandState::Finished);
    }
}
