//! End-to-end flows over the shared fixture config.

use stellar_core::economy::{
    advance_planet, planet_energy_balance, start_structure_upgrade, structure_hourly_production,
    UpgradeStart,
};
use stellar_core::error::Result;
use stellar_core::fleet::{
    collect_debris, convoy_capacity, dispatch, resolve_movement, ArrivalOutcome, Endpoint,
    FleetMovement, FleetOrder, MissionHandler, MissionType, MovementEvent, MovementStatus,
};
use stellar_core::planet::{DebrisField, Position};
use stellar_core::progression::User;
use stellar_core::queue::{enqueue, resolve, ConstructionQueue, FacilityKind};
use stellar_core::resources::{ResourceKind, ResourcePayload};
use stellar_core::reward::{Report, RewardPayload, UserInventory};
use stellar_core::ship_generator::{generate_ship, Rarity};
use stellar_core::time::Timestamp;
use stellar_test_utils::determinism::verify_determinism_parallel;
use stellar_test_utils::fixtures::{
    blueprint, component, empty_planet, home_planet, manifest, research, seeded_rng, test_config,
};

#[test]
fn test_production_accrues_and_caps() {
    let config = test_config();
    let levels = research(&[]);
    let mut planet = home_planet(Timestamp::EPOCH);

    // Mine level 5 yields 5 metal/s; storage level 1 caps metal at 15k
    advance_planet(&config, &mut planet, &levels, Timestamp::from_secs(600)).unwrap();
    assert_eq!(planet.resources.metal, 13_000.0);
    assert_eq!(planet.resources.deuterium, 5_000.0);
    assert_eq!(planet.resources.energy, 50.0);

    let snapshot = planet.clone();
    advance_planet(&config, &mut planet, &levels, Timestamp::from_secs(600)).unwrap();
    assert_eq!(planet, snapshot);

    advance_planet(&config, &mut planet, &levels, Timestamp::from_secs(5_000)).unwrap();
    assert_eq!(planet.resources.metal, 15_000.0);
    assert_eq!(planet.resources.last_update, Timestamp::from_secs(5_000));
}

#[test]
fn test_research_and_biome_boost_production() {
    let config = test_config();
    let planet = empty_planet("p2", Position::new(0, 0, 0), "volcanic", Timestamp::EPOCH);

    // 2 metal/s * 1.2 (research) * 1.5 (biome) * 3600
    let (resource, hourly) = structure_hourly_production(
        &config,
        &planet,
        &research(&[("advanced_mining", 2)]),
        "metal_mine",
        2,
    )
    .unwrap();
    assert_eq!(resource, ResourceKind::Metal);
    assert!((hourly - 12_960.0).abs() < 1e-6);

    let (resource, hourly) =
        structure_hourly_production(&config, &planet, &research(&[]), "command_center", 9)
            .unwrap();
    assert_eq!((resource, hourly), (ResourceKind::Metal, 0.0));
}

#[test]
fn test_upgrade_splits_production_interval() {
    let config = test_config();
    let levels = research(&[]);
    let mut planet = home_planet(Timestamp::EPOCH);

    // Level 6 costs 60 + 40*6 and takes 30 + 10*6 seconds
    let start =
        start_structure_upgrade(&config, &mut planet, "metal_mine", 1, Timestamp::EPOCH).unwrap();
    let UpgradeStart::Started { window, metal_cost } = start else {
        panic!("upgrade should be affordable: {start:?}");
    };
    assert_eq!(metal_cost, 300);
    assert_eq!(window.finish, Timestamp::from_secs(90));
    assert_eq!(planet.resources.metal, 9_700.0);

    // 90s at 5/s, then 100s at 6/s
    let done = advance_planet(&config, &mut planet, &levels, Timestamp::from_secs(190)).unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].level, 6);
    assert_eq!(done[0].finished_at, Timestamp::from_secs(90));
    assert_eq!(planet.resources.metal, 10_750.0);
    assert_eq!(planet.structure_level("metal_mine"), 6);
    assert!(planet.structure("metal_mine").is_some_and(|s| !s.is_upgrading()));
}

#[test]
fn test_energy_shortfall_throttles_production() {
    let config = test_config();
    let levels = research(&[]);
    let mut planet = home_planet(Timestamp::EPOCH);
    // Mine 20 draws 200, solar 5 supplies 100
    planet.structure_or_insert("metal_mine").level = 20;
    planet.structure_or_insert("metal_storage").level = 10;

    let balance = planet_energy_balance(&config, &planet).unwrap();
    assert_eq!(balance.efficiency(), 0.5);

    advance_planet(&config, &mut planet, &levels, Timestamp::from_secs(100)).unwrap();
    assert_eq!(planet.resources.metal, 11_000.0);
    assert_eq!(planet.resources.energy, -100.0);
}

#[test]
fn test_shipyard_flow() {
    let config = test_config();
    let mut planet = home_planet(Timestamp::EPOCH);
    let mut queue = ConstructionQueue::with_capacity(FacilityKind::Shipyard, 2, Timestamp::EPOCH);

    let admission =
        enqueue(&config, &mut queue, &mut planet, "fighter", 3, Timestamp::EPOCH).unwrap();
    assert!(admission.is_accepted());
    assert_eq!(queue.queue_finish_time, Timestamp::from_secs(40));
    assert_eq!(planet.resources.metal, 9_100.0);

    let first = resolve(&mut queue, Timestamp::from_secs(25));
    assert_eq!(first.total_units(), 2);
    first.apply_to(&mut planet);
    assert!(resolve(&mut queue, Timestamp::from_secs(25)).is_empty());

    let second = resolve(&mut queue, Timestamp::from_secs(40));
    second.apply_to(&mut planet);
    assert_eq!(planet.ships_of("fighter"), 3);
    assert!(queue.is_empty());

    let reports = Report::from_queue_resolution(&second);
    assert_eq!(reports[0].title(), "1 x fighter completed");
}

#[test]
fn test_unaffordable_defense_leaves_queue_untouched() {
    let config = test_config();
    let mut planet = home_planet(Timestamp::EPOCH);
    let mut queue = ConstructionQueue::new(FacilityKind::DefenseFactory, Timestamp::EPOCH);
    let before = queue.clone();

    let admission =
        enqueue(&config, &mut queue, &mut planet, "plasma_cannon", 3, Timestamp::EPOCH).unwrap();
    assert!(!admission.is_accepted());
    assert_eq!(queue, before);
    assert_eq!(planet.resources.metal, 10_000.0);

    assert!(enqueue(&config, &mut queue, &mut planet, "death_star", 1, Timestamp::EPOCH).is_err());
}

/// Recycler handler salvaging a single debris field.
struct Salvage {
    debris: DebrisField,
    capacity: f64,
}

impl MissionHandler for Salvage {
    fn on_arrival(
        &mut self,
        movement: &FleetMovement,
        _at: Timestamp,
        _cargo: Option<ResourcePayload>,
    ) -> Result<ArrivalOutcome> {
        assert_eq!(movement.mission, MissionType::Recycle);
        let loot = collect_debris(&self.debris, self.capacity);
        self.debris.resources.metal -= loot.metal;
        self.debris.resources.deuterium -= loot.deuterium;
        self.debris.resources.microchips -= loot.microchips;
        Ok(ArrivalOutcome {
            losses: Default::default(),
            loot: Some(loot),
        })
    }
}

#[test]
fn test_recycle_mission_round_trip() {
    let config = test_config();
    let mut planet = home_planet(Timestamp::EPOCH);
    let debris = DebrisField {
        id: "df1".to_string(),
        position: Position::new(1, 100, 4_200),
        resources: ResourcePayload::new(30_000.0, 5_000.0, 0.0),
    };

    let ships = manifest(&[("recycler", 1)]);
    let capacity = convoy_capacity(&config, &ships).unwrap();
    let order = FleetOrder {
        id: "mv1".to_string(),
        owner: "player".to_string(),
        ships,
        destination: Endpoint::debris(&debris),
        mission: MissionType::Recycle,
        payload: None,
        expedition_seconds: None,
    };
    let mut movement = dispatch(&config, &mut planet, order, Timestamp::EPOCH).unwrap();
    assert_eq!(planet.ships_of("recycler"), 0);
    assert_eq!(movement.travel_seconds, 2);

    let mut handler = Salvage { debris, capacity };
    let events = resolve_movement(&mut movement, Timestamp::from_secs(1), &mut handler).unwrap();
    assert!(events.is_empty());
    assert_eq!(movement.status, MovementStatus::Traveling);

    let events = resolve_movement(&mut movement, Timestamp::from_secs(10), &mut handler).unwrap();
    assert_eq!(events.len(), 2);
    let Some(MovementEvent::Returned { ships, cargo, .. }) = events.last() else {
        panic!("fleet should be home: {events:?}");
    };
    assert_eq!(*cargo, Some(ResourcePayload::new(20_000.0, 0.0, 0.0)));
    assert_eq!(handler.debris.resources.metal, 10_000.0);

    for (ship_type, count) in ships {
        *planet.hangar.entry(ship_type.clone()).or_insert(0) += count;
    }
    if let Some(cargo) = cargo {
        planet.resources.deposit(cargo);
    }
    assert_eq!(planet.ships_of("recycler"), 1);
    assert_eq!(planet.resources.metal, 30_000.0);

    let reports: Vec<_> = events
        .iter()
        .map(|e| Report::from_movement_event(&movement, e))
        .collect();
    assert_eq!(reports[1].title(), "Fleet returned");
}

#[test]
fn test_generated_ship_is_granted_to_inventory() {
    let mut rng = seeded_rng(42);
    let bp = blueprint(Rarity::Legendary);
    let parts: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| component(id, Rarity::Legendary))
        .collect();

    let ship = generate_ship(&bp, &parts, "player", Timestamp::from_secs(9), &mut rng);
    assert_eq!(ship.rarity, Rarity::Legendary);
    assert_eq!(ship.stats.attack, 55.0);
    assert_eq!(ship.stats.shield, 30.0);

    let mut user = User::new("player", 1);
    let mut inventory = UserInventory::new("player");
    RewardPayload::Ship(ship.clone()).grant(&mut user, &mut inventory);
    assert_eq!(inventory.ships, vec![ship]);
}

#[test]
fn test_planet_replay_is_deterministic() {
    let config = test_config();
    let levels = research(&[("advanced_mining", 3)]);
    let instants = [
        Timestamp::from_secs(1),
        Timestamp::from_secs(61),
        Timestamp::from_secs(61),
        Timestamp::from_secs(3_600),
    ];

    let result = verify_determinism_parallel(
        4,
        &instants,
        || home_planet(Timestamp::EPOCH),
        |planet, now| {
            let upgrading = planet
                .structure("solar_plant")
                .is_some_and(|s| s.is_upgrading());
            if now == Timestamp::from_secs(61) && !upgrading {
                start_structure_upgrade(&config, planet, "solar_plant", 1, now).unwrap();
            }
            advance_planet(&config, planet, &levels, now).unwrap();
        },
    );
    result.assert_deterministic();
}
