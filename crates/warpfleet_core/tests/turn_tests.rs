//! End-to-end turn tests over the shared fixture galaxy.
//!
//! These drive [`TurnScheduler`] through whole turns and check what the
//! fleets actually did, rather than poking individual phases.

use warpfleet_core::combat::LargestFleetWins;
use warpfleet_core::config::SimConfig;
use warpfleet_core::fleet::{Fleet, Order, OrderOutcome, Ship};
use warpfleet_core::production::NoProduction;
use warpfleet_core::projection::project_path;
use warpfleet_core::replay::Replay;
use warpfleet_core::scenario::ScenarioData;
use warpfleet_core::scheduler::{TurnEvent, TurnReport, TurnScheduler};
use warpfleet_core::state::GameState;
use warpfleet_test_utils::fixtures::{
    chain_galaxy, fixed, hex, order, spawn, two_empire_state, TERRAN, VORR,
};

fn run_turn(scheduler: &TurnScheduler, state: &mut GameState) -> TurnReport {
    scheduler.process_turn(state, &mut LargestFleetWins, &mut NoProduction)
}

fn warp_jumps(report: &TurnReport) -> usize {
    report
        .events
        .iter()
        .filter(|e| matches!(e, TurnEvent::Moved { warp_jump: true, .. }))
        .count()
}

// =============================================================================
// Interstellar travel
// =============================================================================

#[test]
fn test_travel_across_two_warp_links() {
    let scheduler = TurnScheduler::default();
    let mut state = two_empire_state(chain_galaxy());
    let id = spawn(&mut state, TERRAN, hex(0, 0), 10);
    order(&mut state, id, Order::Move(hex(42, 0)));

    // 3 to the Sol exit, jump, 6 across Vega, jump, 5 to the destination.
    let first = run_turn(&scheduler, &mut state);
    assert_eq!(first.move_ticks(id).len(), 10);

    let second = run_turn(&scheduler, &mut state);
    assert_eq!(second.move_ticks(id).len(), 6);
    assert_eq!(warp_jumps(&first) + warp_jumps(&second), 2);

    let fleet = state.fleet(id).unwrap();
    assert_eq!(fleet.location, hex(42, 0));
    assert!(fleet.orders.is_empty());
    assert_eq!(
        second.outcomes_for(id),
        vec![(Order::Move(hex(42, 0)), OrderOutcome::Completed)]
    );
}

#[test]
fn test_projection_matches_simulated_turns() {
    let scheduler = TurnScheduler::default();
    let config = SimConfig::default();
    let mut state = two_empire_state(chain_galaxy());
    let id = spawn(&mut state, TERRAN, hex(-1, 2), 10);
    order(&mut state, id, Order::Move(hex(41, -2)));

    let track = project_path(state.fleet(id).unwrap(), &state.view(&config), 10);
    assert!(!track.is_empty());
    assert_eq!(track.last().unwrap().hex, hex(41, -2));

    for turn in 1..=3usize {
        run_turn(&scheduler, &mut state);
        let expected = track[(turn * 10).min(track.len()) - 1].hex;
        assert_eq!(state.fleet(id).unwrap().location, expected, "after turn {turn}");
    }
}

#[test]
fn test_unreachable_system_reports_pending_each_turn() {
    let scheduler = TurnScheduler::default();
    let mut galaxy = chain_galaxy();
    galaxy.add_system("Deneb", hex(0, 40)).unwrap();
    let mut state = two_empire_state(galaxy);
    let id = spawn(&mut state, TERRAN, hex(0, 0), 5);
    order(&mut state, id, Order::Move(hex(0, 41)));

    for _ in 0..2 {
        let report = run_turn(&scheduler, &mut state);
        assert_eq!(
            report.outcomes_for(id),
            vec![(Order::Move(hex(0, 41)), OrderOutcome::Pending)]
        );
        assert!(report.move_ticks(id).is_empty());
    }

    let fleet = state.fleet(id).unwrap();
    assert_eq!(fleet.location, hex(0, 0));
    assert_eq!(fleet.orders.len(), 1);
}

// =============================================================================
// Pursuit and merging
// =============================================================================

#[test]
fn test_escort_reaches_and_joins() {
    let scheduler = TurnScheduler::default();
    let mut state = two_empire_state(chain_galaxy());
    let flagship = spawn(&mut state, TERRAN, hex(2, 0), 3);
    let escort = spawn(&mut state, TERRAN, hex(-3, 0), 5);
    order(&mut state, escort, Order::MoveToFleet(flagship));
    order(&mut state, escort, Order::JoinFleet(flagship));

    let report = run_turn(&scheduler, &mut state);

    assert_eq!(report.move_ticks(escort), vec![20, 40, 60, 80, 100]);
    assert!(report
        .events
        .contains(&TurnEvent::FleetJoined { source: escort, target: flagship }));
    assert!(state.fleet(escort).is_none());
    assert_eq!(state.fleet(flagship).unwrap().ships.len(), 2);
    assert!(!state.empire(TERRAN).unwrap().owns(escort));
}

#[test]
fn test_pursuit_of_destroyed_fleet_is_cancelled() {
    let scheduler = TurnScheduler::default();
    let mut state = two_empire_state(chain_galaxy());
    let quarry = spawn(&mut state, VORR, hex(4, -4), 1);
    let hunter = spawn(&mut state, TERRAN, hex(-4, 4), 2);
    order(&mut state, hunter, Order::MoveToFleet(quarry));

    run_turn(&scheduler, &mut state);
    state.destroy_fleet(quarry);
    let report = run_turn(&scheduler, &mut state);

    assert!(matches!(
        report.outcomes_for(hunter).as_slice(),
        [(Order::MoveToFleet(_), OrderOutcome::Cancelled(_))]
    ));
    assert!(state.fleet(hunter).unwrap().orders.is_empty());
}

// =============================================================================
// Combat and colonization
// =============================================================================

#[test]
fn test_larger_fleet_wins_collision() {
    let scheduler = TurnScheduler::default();
    let mut state = two_empire_state(chain_galaxy());
    let battle_group = Fleet::new(TERRAN, "Battle Group", hex(0, 0), fixed(5)).with_ships([
        Ship::new("Resolute", "Cruiser"),
        Ship::new("Valiant", "Destroyer"),
        Ship::new("Swift", "Frigate"),
    ]);
    let attacker = state.spawn_fleet(battle_group).unwrap();
    let picket = spawn(&mut state, VORR, hex(3, -1), 1);
    order(&mut state, attacker, Order::Move(hex(3, -1)));

    let report = run_turn(&scheduler, &mut state);

    assert_eq!(report.combat_count(), 1);
    assert!(report.events.contains(&TurnEvent::Combat {
        tick: 60,
        hex: hex(3, -1),
        winner: attacker,
        loser: picket,
    }));
    assert!(state.fleet(picket).is_none());
    assert_eq!(state.empire(VORR).unwrap().fleet_count(), 0);
}

#[test]
fn test_colony_fleet_settles_free_planet() {
    let scheduler = TurnScheduler::default();
    let mut state = two_empire_state(chain_galaxy());
    let earth = state.galaxy.system_by_name("Sol").unwrap().planets[0].id;
    let colony = spawn(&mut state, VORR, hex(-2, 0), 5);
    order(&mut state, colony, Order::Move(hex(1, 0)));
    order(&mut state, colony, Order::Colonize(None));

    let report = run_turn(&scheduler, &mut state);

    assert!(report.events.contains(&TurnEvent::PlanetColonized {
        fleet: colony,
        empire: VORR,
        planet: earth,
    }));
    assert_eq!(state.galaxy.planet(earth).unwrap().1.owner, Some(VORR));
    assert!(state.fleet(colony).is_none());
}

// =============================================================================
// Scenarios and replays
// =============================================================================

const PATROL: &str = r#"
ScenarioData(
    name: "Patrol",
    systems: [
        (name: "Sol", location: (q: 0, r: 0), planets: [(name: "Earth", location: (q: 1, r: 0))]),
        (name: "Vega", location: (q: 20, r: 0)),
    ],
    links: [(a: "Sol", b: "Vega", at_a: (q: 3, r: 0), at_b: (q: -3, r: 0))],
    empires: [(id: 1, name: "Terran Union"), (id: 2, name: "Vorr Hegemony")],
    fleets: [
        (name: "Patrol", empire: 1, location: (q: 0, r: 0), speed: 4.0,
         orders: [Move((q: 21, r: 1)), Move((q: 0, r: -2))]),
        (name: "Shadow", empire: 2, location: (q: 22, r: -3), speed: 2.5,
         orders: [MoveToFleet("Patrol")]),
    ],
)
"#;

#[test]
fn test_scenario_replay_verifies() {
    let scenario = ScenarioData::from_ron_str(PATROL).unwrap().build().unwrap();
    let scheduler = TurnScheduler::new(scenario.config);
    let mut state = scenario.state.clone();
    let mut replay = Replay::new(scenario.name.clone(), &state).unwrap();

    let patrol = scenario.fleets_by_name["Patrol"];
    for turn in 0..4 {
        if turn == 2 {
            state.queue_order(patrol, Order::Move(hex(2, 2))).unwrap();
            replay.record_order(state.turn, patrol, Order::Move(hex(2, 2)), false);
        }
        run_turn(&scheduler, &mut state);
    }
    replay.finalize(&state);

    let replayed = replay
        .verify(&scheduler, &mut LargestFleetWins, &mut NoProduction)
        .unwrap();
    assert_eq!(replayed.state_hash(), state.state_hash());
    assert_eq!(replayed.turn, 4);
}
