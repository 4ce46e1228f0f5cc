//! Ship and defense configuration.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceCost;

/// Data-driven ship hull definition.
///
/// # Example RON
///
/// ```ron
/// ShipConfig(
///     id: "cruiser",
///     name: "Cruiser",
///     cost: (metal: 20000.0, deuterium: 2000.0, microchips: 7000.0),
///     build_time: 600,
///     speed: 8000.0,
///     capacity: 800.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    /// Unique type key.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Cost per unit.
    pub cost: ResourceCost,
    /// Build time per unit, in seconds.
    pub build_time: u64,
    /// Travel speed in distance units per second.
    pub speed: f64,
    /// Cargo capacity per unit.
    #[serde(default)]
    pub capacity: f64,
}

/// Data-driven planetary defense definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseConfig {
    /// Unique type key.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Cost per unit.
    pub cost: ResourceCost,
    /// Build time per unit, in seconds.
    pub build_time: u64,
}

impl ShipConfig {
    pub(crate) fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.speed.is_finite() || self.speed <= 0.0 {
            errors.push(format!("ship '{}': speed must be positive", self.id));
        }
        if !self.capacity.is_finite() || self.capacity < 0.0 {
            errors.push(format!("ship '{}': capacity must be non-negative", self.id));
        }
        if !self.cost.is_valid() {
            errors.push(format!("ship '{}': cost must be non-negative", self.id));
        }
        errors
    }
}

impl DefenseConfig {
    pub(crate) fn validate(&self) -> Vec<String> {
        if self.cost.is_valid() {
            Vec::new()
        } else {
            vec![format!("defense '{}': cost must be non-negative", self.id)]
        }
    }
}
