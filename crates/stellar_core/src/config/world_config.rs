//! Research and biome definitions.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceKind;

/// Production boost granted by each level of a research.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionBoost {
    /// Boosted resource.
    pub resource: ResourceKind,
    /// Percent added per research level (10 for +10%).
    pub percent_per_level: f64,
}

/// Data-driven research definition.
///
/// # Example RON
///
/// ```ron
/// ResearchConfig(
///     id: "advanced_mining",
///     name: "Advanced Mining",
///     production_boosts: [(resource: metal, percent_per_level: 5.0)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Unique research key.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Production boosts per level.
    #[serde(default)]
    pub production_boosts: Vec<ProductionBoost>,
}

/// Percentage production modifier of a biome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomeModifier {
    /// Affected resource.
    pub resource: ResourceKind,
    /// Percent modifier; negative values penalise.
    pub percent: f64,
}

/// Data-driven planet biome definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeConfig {
    /// Unique biome key.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Production modifiers.
    #[serde(default)]
    pub production_modifiers: Vec<BiomeModifier>,
}

impl BiomeConfig {
    /// Percent modifier for a resource, 0 when the biome has none.
    #[must_use]
    pub fn percent_for(&self, resource: ResourceKind) -> f64 {
        self.production_modifiers
            .iter()
            .filter(|m| m.resource == resource)
            .map(|m| m.percent)
            .sum()
    }

    pub(crate) fn validate(&self) -> Vec<String> {
        self.production_modifiers
            .iter()
            .filter(|m| !m.percent.is_finite() || m.percent <= -100.0)
            .map(|m| {
                format!(
                    "biome '{}': {} modifier must be finite and above -100%",
                    self.id, m.resource
                )
            })
            .collect()
    }
}

impl ResearchConfig {
    /// Percent per level this research adds to `resource`.
    #[must_use]
    pub fn percent_per_level(&self, resource: ResourceKind) -> f64 {
        self.production_boosts
            .iter()
            .filter(|b| b.resource == resource)
            .map(|b| b.percent_per_level)
            .sum()
    }
}
