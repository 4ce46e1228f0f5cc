//! Hydration of persisted documents that may be missing or partial.
//!
//! Every `hydrate_*` function is total: absent or malformed fields take
//! their defaults and malformed list entries are dropped, each with a
//! `warn!`. The calculators only ever see fully populated values.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::progression::User;
use crate::queue::{ConstructionQueue, FacilityKind, QueueCommand};
use crate::reward::UserInventory;
use crate::time::Timestamp;

type Object = Map<String, Value>;

fn as_object<'a>(document: Option<&'a Value>, what: &str) -> Option<&'a Object> {
    match document {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            tracing::warn!(document = what, "Document is not an object, using defaults");
            None
        }
    }
}

fn field<T: DeserializeOwned>(map: &Object, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = key, error = %err, "Malformed document field, using default");
            None
        }
    }
}

fn list<T: DeserializeOwned>(map: &Object, key: &str) -> Vec<T> {
    let Some(items) = map.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(field = key, index, error = %err, "Dropping malformed entry");
                None
            }
        })
        .collect()
}

/// Construction queue from a stored document.
///
/// A missing document yields an empty queue with capacity 1 and both
/// timestamps at `now`.
#[must_use]
pub fn hydrate_queue(
    kind: FacilityKind,
    document: Option<&Value>,
    now: Timestamp,
) -> ConstructionQueue {
    let mut queue = ConstructionQueue::new(kind, now);
    let Some(map) = as_object(document, "construction_queue") else {
        return queue;
    };

    if let Some(capacity) = field::<u32>(map, "capacity").filter(|c| *c > 0) {
        queue.capacity = capacity;
    }
    queue.commands = list::<QueueCommand>(map, "commands")
        .into_iter()
        .filter(|c| c.count > 0 && c.completed <= c.count)
        .collect();
    queue.queue_start_time = field(map, "queue_start_time").unwrap_or(now);
    queue.queue_finish_time = field(map, "queue_finish_time").unwrap_or(now);

    if let Some(last) = queue.commands.back() {
        queue.queue_finish_time = queue.queue_finish_time.max(last.construction_finish_time);
    }
    if let Some(first) = queue.commands.front() {
        queue.queue_start_time = first.construction_start_time;
    }

    queue
}

/// User inventory from a stored document.
#[must_use]
pub fn hydrate_inventory(user_id: &str, document: Option<&Value>) -> UserInventory {
    let mut inventory = UserInventory::new(user_id);
    let Some(map) = as_object(document, "inventory") else {
        return inventory;
    };

    inventory.resources = field(map, "resources").unwrap_or_default();
    inventory.blueprints = list(map, "blueprints");
    inventory.components = list(map, "components");
    inventory.ships = list(map, "ships");
    inventory
}

/// User from a stored document. The level is always recomputed from points.
#[must_use]
pub fn hydrate_user(user_id: &str, document: Option<&Value>) -> User {
    let mut user = User::new(user_id, 0);
    if let Some(map) = as_object(document, "user") {
        user.season = field(map, "season").unwrap_or_default();
        user.onboarding_step = field(map, "onboarding_step").unwrap_or_default();
        user.home_planet = field(map, "home_planet");
        user.score = field(map, "score").unwrap_or_default();
        user.xp = field(map, "xp").unwrap_or_default();
        user.title = field(map, "title").unwrap_or_default();
        user.reputation_points = field(map, "reputation_points").unwrap_or_default();
    }
    user.refresh_level();
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_queue_document() {
        let now = Timestamp::from_secs(500);
        for document in [None, Some(&Value::Null), Some(&json!("garbage")), Some(&json!({}))] {
            let queue = hydrate_queue(FacilityKind::Shipyard, document, now);
            assert!(queue.commands.is_empty());
            assert_eq!(queue.capacity, 1);
            assert_eq!(queue.queue_start_time, now);
            assert_eq!(queue.queue_finish_time, now);
        }
    }

    #[test]
    fn test_partial_queue_document() {
        let now = Timestamp::from_secs(500);
        let document = json!({
            "capacity": 3,
            "commands": [
                {
                    "item_type": "fighter",
                    "count": 4,
                    "unit_seconds": 10,
                    "slots": 3,
                    "construction_start_time": 100_000,
                    "construction_finish_time": 120_000,
                    "current_item_start_time": 100_000,
                    "current_item_finish_time": 110_000
                },
                {"item_type": "bomber"}
            ],
            "queue_finish_time": "yesterday"
        });

        let queue = hydrate_queue(FacilityKind::Shipyard, Some(&document), now);
        assert_eq!(queue.capacity, 3);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.commands[0].completed, 0);
        assert_eq!(queue.queue_start_time, Timestamp::from_secs(100));
        assert_eq!(queue.queue_finish_time, now);
    }

    #[test]
    fn test_zero_capacity_falls_back() {
        let document = json!({"capacity": 0});
        let queue = hydrate_queue(FacilityKind::DefenseFactory, Some(&document), Timestamp::EPOCH);
        assert_eq!(queue.capacity, 1);
        assert_eq!(queue.kind, FacilityKind::DefenseFactory);
    }

    #[test]
    fn test_inventory_drops_bad_entries() {
        let document = json!({
            "resources": {"metal": 50.0},
            "components": [
                {"id": "c1", "rarity": "epic"},
                {"id": "c2", "rarity": "mythic"}
            ]
        });
        let inventory = hydrate_inventory("u1", Some(&document));
        assert_eq!(inventory.user_id, "u1");
        assert_eq!(inventory.resources.metal, 50.0);
        assert_eq!(inventory.components.len(), 1);
        assert!(inventory.blueprints.is_empty());
    }

    #[test]
    fn test_user_level_recomputed() {
        let document = json!({"reputation_points": 125, "level": 99, "home_planet": "p1"});
        let user = hydrate_user("u1", Some(&document));
        assert_eq!(user.level, 2);
        assert_eq!(user.home_planet.as_deref(), Some("p1"));

        let fresh = hydrate_user("u2", None);
        assert_eq!(fresh.level, 0);
        assert_eq!(fresh.reputation_points, 0);
    }
}
