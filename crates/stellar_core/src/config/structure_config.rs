//! Structure configuration: cost/time curves, production, energy and storage.

use serde::{Deserialize, Serialize};

use crate::economy::upgrade_structure_cost;
use crate::resources::ResourceKind;

/// Shape of a level-dependent cost curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostShape {
    /// `base + per_level * level`.
    Linear,
    /// `(base * level) ^ power`.
    Exponential,
    /// `base` at every level.
    Flat,
}

/// Level-dependent cost or duration curve.
///
/// Exactly one of `per_level`/`power` is expected; with neither the curve is
/// flat. When both are present the linear shape wins.
///
/// # Example RON
///
/// ```ron
/// (base: 60.0, per_level: 40.0)   // linear
/// (base: 25.0, power: 1.5)        // exponential
/// (base: 500.0)                   // flat
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostCurve {
    /// Base amount.
    pub base: f64,
    /// Linear increment per level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_level: Option<f64>,
    /// Exponent of the exponential shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

impl CostCurve {
    /// Linear curve.
    #[must_use]
    pub const fn linear(base: f64, per_level: f64) -> Self {
        Self {
            base,
            per_level: Some(per_level),
            power: None,
        }
    }

    /// Exponential curve.
    #[must_use]
    pub const fn exponential(base: f64, power: f64) -> Self {
        Self {
            base,
            per_level: None,
            power: Some(power),
        }
    }

    /// Flat curve.
    #[must_use]
    pub const fn flat(base: f64) -> Self {
        Self {
            base,
            per_level: None,
            power: None,
        }
    }

    /// The shape this curve evaluates with.
    #[must_use]
    pub const fn shape(&self) -> CostShape {
        match (self.per_level, self.power) {
            (Some(_), _) => CostShape::Linear,
            (None, Some(_)) => CostShape::Exponential,
            (None, None) => CostShape::Flat,
        }
    }

    /// Unrounded value of the curve at `level`.
    #[must_use]
    pub fn raw_at(&self, level: u32) -> f64 {
        let level = f64::from(level);
        match (self.per_level, self.power) {
            (Some(per_level), _) => self.base + per_level * level,
            (None, Some(power)) => (self.base * level).powf(power),
            (None, None) => self.base,
        }
    }

    /// Cost at `level`, scaled by `reduction_coef` and floored to a multiple of 10.
    #[must_use]
    pub fn cost_at(&self, level: u32, reduction_coef: f64) -> u64 {
        upgrade_structure_cost(self.base, self.per_level, self.power, level, reduction_coef)
    }
}

/// A quantity linear in structure level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearRate {
    /// Value at level 0.
    pub base: f64,
    /// Increment per level.
    #[serde(default)]
    pub per_level: f64,
}

impl LinearRate {
    /// Create a linear rate.
    #[must_use]
    pub const fn new(base: f64, per_level: f64) -> Self {
        Self { base, per_level }
    }

    /// Value at `level`.
    #[must_use]
    pub fn at(&self, level: u32) -> f64 {
        self.base + self.per_level * f64::from(level)
    }
}

/// Resource production of a structure, per second before boosts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionSpec {
    /// Produced resource. A structure with no resource produces nothing.
    #[serde(default)]
    pub resource: Option<ResourceKind>,
    /// Rate at level 0.
    #[serde(default)]
    pub base: f64,
    /// Rate increment per level.
    #[serde(default)]
    pub per_level: f64,
}

/// Storage role of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSpec {
    /// Resource whose cap this structure raises.
    pub resource: ResourceKind,
    /// Capacity at level 0.
    pub base: f64,
    /// Capacity increment per level.
    #[serde(default)]
    pub per_level: f64,
}

/// Data-driven structure definition.
///
/// # Example RON
///
/// ```ron
/// StructureConfig(
///     id: "metal_mine",
///     name: "Metal Mine",
///     cost: (base: 60.0, per_level: 40.0),
///     build_time: (base: 30.0, power: 1.2),
///     production: Some((resource: Some(metal), base: 0.5, per_level: 0.25)),
///     energy_consumption: Some((base: 2.0, per_level: 1.0)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Unique type key.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Metal cost per level.
    pub cost: CostCurve,
    /// Upgrade duration per level, in seconds.
    pub build_time: CostCurve,
    /// Resource production.
    #[serde(default)]
    pub production: Option<ProductionSpec>,
    /// Energy drawn while running at 100%.
    #[serde(default)]
    pub energy_consumption: Option<LinearRate>,
    /// Energy generated. Only honoured for the designated energy structure.
    #[serde(default)]
    pub energy_production: Option<LinearRate>,
    /// Storage role.
    #[serde(default)]
    pub storage: Option<StorageSpec>,
}

impl StructureConfig {
    /// Problems with this entry, empty if valid.
    pub(crate) fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (label, curve) in [("cost", &self.cost), ("build_time", &self.build_time)] {
            if curve.per_level.is_some() && curve.power.is_some() {
                errors.push(format!(
                    "structure '{}': {label} sets both per_level and power",
                    self.id
                ));
            }
            if !curve.base.is_finite() || curve.base < 0.0 {
                errors.push(format!(
                    "structure '{}': {label} base must be non-negative",
                    self.id
                ));
            }
        }
        if let Some(ProductionSpec {
            resource: Some(ResourceKind::Energy),
            ..
        }) = self.production
        {
            errors.push(format!(
                "structure '{}': energy is produced through energy_production",
                self.id
            ));
        }
        if let Some(storage) = &self.storage {
            if storage.resource == ResourceKind::Energy {
                errors.push(format!("structure '{}': energy cannot be stored", self.id));
            }
        }
        errors
    }
}
