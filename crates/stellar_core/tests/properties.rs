//! Property tests for the economy, travel and progression formulas.

use proptest::prelude::*;
use stellar_core::economy::{can_upgrade_structure, upgrade_structure_cost};
use stellar_core::fleet::{calculate_fleet_arrival_time, slowest_speed};
use stellar_core::progression::{calculate_reputation_level, required_points_for_level};
use stellar_core::ship_generator::Rarity;
use stellar_core::time::Timestamp;
use stellar_test_utils::fixtures::{home_planet, test_config};
use stellar_test_utils::strategies::{
    arb_cost_curve, arb_level, arb_manifest, arb_points, arb_position, arb_rarity,
    arb_reduction_coef,
};

proptest! {
    #[test]
    fn reputation_inverse_round_trips(level in 0u32..=40) {
        let points = required_points_for_level(level);
        prop_assert_eq!(calculate_reputation_level(points as i64), level);
    }

    #[test]
    fn non_positive_points_are_level_zero(points in i64::MIN..=0) {
        prop_assert_eq!(calculate_reputation_level(points), 0);
    }

    #[test]
    fn reputation_level_is_monotonic(a in arb_points(), b in arb_points()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calculate_reputation_level(low) <= calculate_reputation_level(high));
    }

    #[test]
    fn upgrade_cost_is_monotonic_in_level(
        curve in arb_cost_curve(),
        level in arb_level(),
        coef in arb_reduction_coef(),
    ) {
        let here = upgrade_structure_cost(curve.base, curve.per_level, curve.power, level, coef);
        let next =
            upgrade_structure_cost(curve.base, curve.per_level, curve.power, level + 1, coef);
        prop_assert!(here <= next, "{:?}: {} > {}", curve.shape(), here, next);
        prop_assert_eq!(here % 10, 0);
    }

    #[test]
    fn unaffordable_upgrade_reports_summed_cost(current in 0u32..50, levels in 1u32..10) {
        let config = test_config();
        let mut planet = home_planet(Timestamp::EPOCH);
        planet.resources.metal = 0.0;

        let check = can_upgrade_structure(&config, &planet, "metal_mine", current, levels).unwrap();
        let expected: u64 = (current + 1..=current + levels)
            .map(|level| upgrade_structure_cost(60.0, Some(40.0), None, level, 1.0))
            .sum();
        prop_assert!(!check.allowed);
        prop_assert!(check.reason.is_some());
        prop_assert_eq!(check.metal_cost, expected);
    }

    #[test]
    fn travel_takes_at_least_one_second(
        ships in arb_manifest(),
        position in arb_position(),
        now in 0i64..1_000_000_000,
    ) {
        let config = test_config();
        let now = Timestamp::from_millis(now);
        let (arrival, secs) =
            calculate_fleet_arrival_time(&config, &ships, position, position, now).unwrap();
        prop_assert!(secs >= 1);
        prop_assert!(arrival > now);
    }

    #[test]
    fn convoy_moves_at_slowest_member(ships in arb_manifest()) {
        let config = test_config();
        let expected = ships
            .keys()
            .map(|ship_type| config.ship(ship_type).unwrap().speed)
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!(slowest_speed(&config, &ships).unwrap(), expected);
    }

    #[test]
    fn rarity_never_drops_with_more_points(points in 0u32..500, extra in 0u32..100) {
        prop_assert!(Rarity::for_points(points) <= Rarity::for_points(points + extra));
    }

    #[test]
    fn component_points_below_blueprint_points(rarity in arb_rarity()) {
        prop_assert!(rarity.component_points() < rarity.blueprint_points());
    }
}
