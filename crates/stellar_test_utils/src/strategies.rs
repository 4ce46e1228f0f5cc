//! Proptest strategies for engine inputs.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of the formulas.

use proptest::prelude::*;
use stellar_core::config::CostCurve;
use stellar_core::fleet::ShipManifest;
use stellar_core::planet::Position;
use stellar_core::ship_generator::Rarity;

/// Ship types defined in the fixture config.
pub const FIXTURE_SHIP_TYPES: [&str; 5] =
    ["fighter", "cruiser", "transporter", "recycler", "probe"];

/// Position within a modest universe.
pub fn arb_position() -> impl Strategy<Value = Position> {
    (0i32..10, -50_000i32..50_000, -50_000i32..50_000)
        .prop_map(|(galaxy, x, y)| Position::new(galaxy, x, y))
}

/// Structure level.
pub fn arb_level() -> impl Strategy<Value = u32> {
    0u32..200
}

/// Cost curve of any shape with positive parameters.
pub fn arb_cost_curve() -> impl Strategy<Value = CostCurve> {
    prop_oneof![
        (1.0f64..10_000.0, 0.0f64..5_000.0).prop_map(|(b, p)| CostCurve::linear(b, p)),
        (0.1f64..100.0, 1.0f64..2.5).prop_map(|(b, p)| CostCurve::exponential(b, p)),
        (0.0f64..100_000.0).prop_map(CostCurve::flat),
    ]
}

/// Cost reduction coefficient.
pub fn arb_reduction_coef() -> impl Strategy<Value = f64> {
    0.1f64..=1.0
}

/// Reputation point total, including negatives.
pub fn arb_points() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000_000
}

/// Any rarity tier.
pub fn arb_rarity() -> impl Strategy<Value = Rarity> {
    prop_oneof![
        Just(Rarity::Common),
        Just(Rarity::Rare),
        Just(Rarity::Epic),
        Just(Rarity::Legendary),
    ]
}

/// Non-empty manifest of fixture ship types.
pub fn arb_manifest() -> impl Strategy<Value = ShipManifest> {
    proptest::array::uniform5(0u64..100)
        .prop_map(|counts| {
            FIXTURE_SHIP_TYPES
                .iter()
                .zip(counts)
                .filter(|(_, count)| *count > 0)
                .map(|(ship_type, count)| ((*ship_type).to_string(), count))
                .collect::<ShipManifest>()
        })
        .prop_filter("manifest must hold a ship", |m| !m.is_empty())
}
