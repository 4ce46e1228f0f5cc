//! Resource kinds, planet ledgers and resource bundles.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A resource tracked in a planet ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Primary construction material.
    Metal,
    /// Fuel.
    Deuterium,
    /// Electronics for advanced hulls.
    Microchips,
    /// Net power balance; not stockpiled.
    Energy,
}

impl ResourceKind {
    /// Resources that accumulate over time.
    pub const STOCKPILED: [Self; 3] = [Self::Metal, Self::Deuterium, Self::Microchips];

    /// Lowercase key used in config files and documents.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Metal => "metal",
            Self::Deuterium => "deuterium",
            Self::Microchips => "microchips",
            Self::Energy => "energy",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// An amount of each stockpiled resource.
///
/// Used both for costs and for cargo carried by fleets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBundle {
    /// Metal amount.
    pub metal: f64,
    /// Deuterium amount.
    pub deuterium: f64,
    /// Microchip amount.
    pub microchips: f64,
}

/// A construction cost.
pub type ResourceCost = ResourceBundle;

/// Cargo carried by a fleet movement.
pub type ResourcePayload = ResourceBundle;

impl ResourceBundle {
    /// Empty bundle.
    pub const ZERO: Self = Self {
        metal: 0.0,
        deuterium: 0.0,
        microchips: 0.0,
    };

    /// Create a bundle.
    #[must_use]
    pub const fn new(metal: f64, deuterium: f64, microchips: f64) -> Self {
        Self {
            metal,
            deuterium,
            microchips,
        }
    }

    /// Sum of all amounts, used against cargo capacity.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.metal + self.deuterium + self.microchips
    }

    /// Whether every amount is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0.0
    }

    /// Whether any amount is negative or not finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.metal, self.deuterium, self.microchips]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Every amount multiplied by `count`.
    #[must_use]
    pub fn times(&self, count: u64) -> Self {
        let n = count as f64;
        Self::new(self.metal * n, self.deuterium * n, self.microchips * n)
    }

    /// Amount of a single resource. Energy is never part of a bundle.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Deuterium => self.deuterium,
            ResourceKind::Microchips => self.microchips,
            ResourceKind::Energy => 0.0,
        }
    }
}

impl std::ops::Add for ResourceBundle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.metal + rhs.metal,
            self.deuterium + rhs.deuterium,
            self.microchips + rhs.microchips,
        )
    }
}

impl std::ops::AddAssign for ResourceBundle {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Resources stored on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Stored metal.
    pub metal: f64,
    /// Stored deuterium.
    pub deuterium: f64,
    /// Stored microchips.
    pub microchips: f64,
    /// Energy balance at `last_update` (production minus consumption).
    pub energy: f64,
    /// Instant up to which production has been applied.
    pub last_update: Timestamp,
}

impl ResourceLedger {
    /// Create a ledger with stockpiles and a last update time.
    #[must_use]
    pub const fn new(metal: f64, deuterium: f64, microchips: f64, last_update: Timestamp) -> Self {
        Self {
            metal,
            deuterium,
            microchips,
            energy: 0.0,
            last_update,
        }
    }

    /// Amount of a resource.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Deuterium => self.deuterium,
            ResourceKind::Microchips => self.microchips,
            ResourceKind::Energy => self.energy,
        }
    }

    /// Mutable access to a resource amount.
    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Metal => &mut self.metal,
            ResourceKind::Deuterium => &mut self.deuterium,
            ResourceKind::Microchips => &mut self.microchips,
            ResourceKind::Energy => &mut self.energy,
        }
    }

    /// Stockpiled resources as a bundle.
    #[must_use]
    pub const fn stockpile(&self) -> ResourceBundle {
        ResourceBundle::new(self.metal, self.deuterium, self.microchips)
    }

    /// Check whether the ledger covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        self.metal >= cost.metal
            && self.deuterium >= cost.deuterium
            && self.microchips >= cost.microchips
    }

    /// Deduct a cost if affordable.
    ///
    /// Returns `false` and leaves the ledger untouched otherwise.
    pub fn spend(&mut self, cost: &ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.metal -= cost.metal;
        self.deuterium -= cost.deuterium;
        self.microchips -= cost.microchips;
        true
    }

    /// Add a bundle to the stockpile.
    pub fn deposit(&mut self, bundle: &ResourceBundle) {
        self.metal += bundle.metal;
        self.deuterium += bundle.deuterium;
        self.microchips += bundle.microchips;
    }

    /// First stockpiled resource that falls short of `cost`, with the missing amount.
    #[must_use]
    pub fn shortfall(&self, cost: &ResourceCost) -> Option<(ResourceKind, f64)> {
        ResourceKind::STOCKPILED.into_iter().find_map(|kind| {
            let missing = cost.get(kind) - self.get(kind);
            (missing > 0.0).then_some((kind, missing))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_arithmetic() {
        let a = ResourceBundle::new(10.0, 5.0, 1.0);
        let b = a.times(3);
        assert_eq!(b, ResourceBundle::new(30.0, 15.0, 3.0));
        assert_eq!((a + b).total(), 64.0);
    }

    #[test]
    fn test_ledger_spend() {
        let mut ledger = ResourceLedger::new(100.0, 50.0, 0.0, Timestamp::EPOCH);
        assert!(ledger.spend(&ResourceCost::new(60.0, 50.0, 0.0)));
        assert_eq!(ledger.metal, 40.0);
        assert_eq!(ledger.deuterium, 0.0);

        // Unaffordable spend leaves the ledger untouched
        assert!(!ledger.spend(&ResourceCost::new(50.0, 0.0, 0.0)));
        assert_eq!(ledger.metal, 40.0);
    }

    #[test]
    fn test_ledger_shortfall() {
        let ledger = ResourceLedger::new(100.0, 0.0, 0.0, Timestamp::EPOCH);
        assert_eq!(
            ledger.shortfall(&ResourceCost::new(50.0, 20.0, 0.0)),
            Some((ResourceKind::Deuterium, 20.0))
        );
        assert_eq!(ledger.shortfall(&ResourceCost::new(50.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_bundle_validity() {
        assert!(ResourceBundle::new(1.0, 0.0, 0.0).is_valid());
        assert!(!ResourceBundle::new(-1.0, 0.0, 0.0).is_valid());
        assert!(!ResourceBundle::new(f64::NAN, 0.0, 0.0).is_valid());
    }
}
