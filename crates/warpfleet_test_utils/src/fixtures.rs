//! Test fixtures and helpers.
//!
//! Pre-built galaxies and game states for consistent testing.

use fixed::types::I32F32;
use warpfleet_core::empire::EmpireId;
use warpfleet_core::fleet::{Fleet, FleetId, Order, Ship};
use warpfleet_core::galaxy::Galaxy;
use warpfleet_core::hex::HexCoord;
use warpfleet_core::state::GameState;

/// The first fixture empire.
pub const TERRAN: EmpireId = EmpireId(1);

/// The second fixture empire.
pub const VORR: EmpireId = EmpireId(2);

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Shorthand for a hex.
#[must_use]
pub const fn hex(q: i32, r: i32) -> HexCoord {
    HexCoord::new(q, r)
}

/// Three systems in a row, 20 hexes apart, linked Sol - Vega - Rigel.
///
/// Each link leaves 3 hexes east of a centre and arrives 3 hexes west of
/// the next one. Sol has a planet, Earth, one hex east of its centre, and
/// Vega has Vega Prime two hexes north-east.
///
/// # Panics
///
/// Never, the layout is fixed.
#[must_use]
pub fn chain_galaxy() -> Galaxy {
    let mut galaxy = Galaxy::new();
    let sol = galaxy.add_system("Sol", hex(0, 0)).expect("Sol");
    let vega = galaxy.add_system("Vega", hex(20, 0)).expect("Vega");
    let rigel = galaxy.add_system("Rigel", hex(40, 0)).expect("Rigel");
    galaxy.add_planet(sol, "Earth", hex(1, 0)).expect("Earth");
    galaxy.add_planet(vega, "Vega Prime", hex(2, -1)).expect("Vega Prime");
    galaxy.link(sol, vega, hex(3, 0), hex(-3, 0)).expect("Sol-Vega");
    galaxy.link(vega, rigel, hex(3, 0), hex(-3, 0)).expect("Vega-Rigel");
    galaxy
}

/// A state over `galaxy` with the two fixture empires registered.
///
/// # Panics
///
/// Never, the empire ids are distinct.
#[must_use]
pub fn two_empire_state(galaxy: Galaxy) -> GameState {
    let mut state = GameState::new(galaxy);
    state.add_empire(TERRAN, "Terran Union").expect("Terran");
    state.add_empire(VORR, "Vorr Hegemony").expect("Vorr");
    state
}

/// Spawn a one-ship fleet and return its id.
///
/// # Panics
///
/// Panics if `owner` is not registered in `state`.
pub fn spawn(state: &mut GameState, owner: EmpireId, location: HexCoord, speed: i32) -> FleetId {
    let name = format!("{owner} fleet {}", state.fleets.len() + 1);
    let fleet = Fleet::new(owner, name, location, fixed(speed))
        .with_ships([Ship::new("Lead", "Frigate")]);
    state.spawn_fleet(fleet).expect("owner must be registered")
}

/// Queue an order, panicking on an unknown fleet.
///
/// # Panics
///
/// Panics if the fleet does not exist.
pub fn order(state: &mut GameState, fleet: FleetId, order: Order) {
    state.queue_order(fleet, order).expect("fleet must exist");
}

/// A busy two-empire game on the chain galaxy.
///
/// Mixes every order kind: an interstellar move, mutual pursuit, a join,
/// and a colonization run, so a few turns touch every scheduler phase.
#[must_use]
pub fn skirmish_state() -> GameState {
    let mut state = two_empire_state(chain_galaxy());

    let traveller = spawn(&mut state, TERRAN, hex(0, 0), 7);
    order(&mut state, traveller, Order::Move(hex(42, 1)));

    let hunter = spawn(&mut state, TERRAN, hex(-4, 2), 4);
    let raider = spawn(&mut state, VORR, hex(22, -2), 3);
    order(&mut state, hunter, Order::MoveToFleet(raider));
    order(&mut state, raider, Order::MoveToFleet(hunter));

    let straggler = spawn(&mut state, TERRAN, hex(2, 3), 2);
    order(&mut state, straggler, Order::MoveToFleet(traveller));
    order(&mut state, straggler, Order::JoinFleet(traveller));

    let colonist = spawn(&mut state, VORR, hex(18, 2), 1);
    order(&mut state, colonist, Order::Move(hex(22, -1)));
    order(&mut state, colonist, Order::Colonize(None));

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_galaxy_is_linked() {
        let galaxy = chain_galaxy();
        assert_eq!(galaxy.len(), 3);
        let sol = galaxy.system_by_name("Sol").unwrap();
        let vega = galaxy.system_by_name("Vega").unwrap();
        assert!(sol.warp_point_to(vega.id).is_some());
        assert!(vega.warp_point_to(sol.id).is_some());
    }

    #[test]
    fn test_skirmish_state_fleets() {
        let state = skirmish_state();
        assert_eq!(state.fleets.len(), 5);
        assert_eq!(state.empire(TERRAN).unwrap().fleet_count(), 3);
        assert_eq!(state.empire(VORR).unwrap().fleet_count(), 2);
    }
}
