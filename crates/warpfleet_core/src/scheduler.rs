//! Turn scheduler: sub-tick movement, merging, collisions, and end-of-turn
//! order resolution.
//!
//! A turn is a fixed number of sub-ticks (100 by default) followed by
//! end-of-turn orders and then production. Each sub-tick runs four phases
//! in strict order:
//!
//! 1. **Instant join** - `JoinFleet` orders whose fleets already share a hex
//!    merge immediately.
//! 2. **Move calculation** - every fleet due to move this sub-tick resolves
//!    its destination against the same view, re-paths if the destination
//!    changed, and picks the next hex on its path. Locations are not
//!    touched yet.
//! 3. **Move application** - all collected moves are applied at once. A
//!    fleet whose path runs out completes its current order.
//! 4. **Conflict detection** - any hex holding fleets of more than one
//!    empire is handed to the [`CombatResolver`] until one empire remains.
//!
//! Fleets are always visited in ascending [`FleetId`] order, so a turn is
//! a pure function of the state, the orders, and the combat resolver.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::combat::CombatResolver;
use crate::config::SimConfig;
use crate::empire::EmpireId;
use crate::fleet::{CancelReason, Fleet, FleetId, Order, OrderOutcome};
use crate::galaxy::PlanetId;
use crate::hex::HexCoord;
use crate::pathfinding::{hybrid_path, is_warp_jump};
use crate::production::ProductionProcessor;
use crate::projection::{resolve_target, Target};
use crate::state::{GameState, WorldView};

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A fleet entered a new hex.
    Moved {
        /// Sub-tick of the move (1-based).
        tick: u32,
        /// Fleet that moved.
        fleet: FleetId,
        /// Previous hex.
        from: HexCoord,
        /// New hex.
        to: HexCoord,
        /// True if the step crossed a warp link.
        warp_jump: bool,
    },
    /// An order left the pending state, or could not make progress.
    OrderResolved {
        /// Fleet owning the order.
        fleet: FleetId,
        /// The order.
        order: Order,
        /// What happened to it.
        outcome: OrderOutcome,
    },
    /// A fleet merged into another and ceased to exist.
    FleetJoined {
        /// Fleet that was absorbed.
        source: FleetId,
        /// Fleet that received the ships.
        target: FleetId,
    },
    /// A colony fleet settled a planet and was consumed.
    PlanetColonized {
        /// Fleet that was consumed.
        fleet: FleetId,
        /// New owner of the planet.
        empire: EmpireId,
        /// The planet.
        planet: PlanetId,
    },
    /// One encounter of a multi-empire collision.
    Combat {
        /// Sub-tick of the encounter (1-based).
        tick: u32,
        /// Contested hex.
        hex: HexCoord,
        /// Surviving fleet.
        winner: FleetId,
        /// Destroyed fleet.
        loser: FleetId,
    },
}

/// Everything that happened during one call to
/// [`TurnScheduler::process_turn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// The turn that was processed (0 for the first turn).
    pub turn: u64,
    /// Events in the order they occurred.
    pub events: Vec<TurnEvent>,
    /// [`GameState::state_hash`] after the turn.
    pub state_hash: u64,
}

impl TurnReport {
    /// Order outcomes reported for one fleet, in order.
    #[must_use]
    pub fn outcomes_for(&self, fleet: FleetId) -> Vec<(Order, OrderOutcome)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TurnEvent::OrderResolved {
                    fleet: f,
                    order,
                    outcome,
                } if *f == fleet => Some((*order, *outcome)),
                _ => None,
            })
            .collect()
    }

    /// Sub-ticks on which a fleet moved.
    #[must_use]
    pub fn move_ticks(&self, fleet: FleetId) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TurnEvent::Moved { tick, fleet: f, .. } if *f == fleet => Some(*tick),
                _ => None,
            })
            .collect()
    }

    /// Number of combat encounters.
    #[must_use]
    pub fn combat_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TurnEvent::Combat { .. }))
            .count()
    }
}

/// What a fleet will do on a move tick, decided against a read-only view.
enum MovePlan {
    /// Nothing to do this tick.
    Idle,
    /// Drop the current order.
    Cancel(Order, CancelReason),
    /// Already standing on the destination.
    Arrived(Order),
    /// Destination is not reachable from here; keep the order.
    Blocked(Order),
    /// Take the next step, replacing the cached path first if given.
    Advance(Option<Vec<HexCoord>>),
}

/// Drives whole turns over a [`GameState`].
#[derive(Debug, Clone, Default)]
pub struct TurnScheduler {
    config: SimConfig,
}

impl TurnScheduler {
    /// Create a scheduler with the given configuration.
    #[must_use]
    pub const fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Process one full turn: all sub-ticks, end-of-turn orders, then
    /// production. The state's turn counter is incremented.
    pub fn process_turn<C, P>(
        &self,
        state: &mut GameState,
        combat: &mut C,
        production: &mut P,
    ) -> TurnReport
    where
        C: CombatResolver + ?Sized,
        P: ProductionProcessor + ?Sized,
    {
        let mut report = TurnReport {
            turn: state.turn,
            ..TurnReport::default()
        };
        let mut blocked = BTreeSet::new();

        for tick in 1..=self.config.sub_ticks_per_turn {
            self.instant_join_phase(state, &mut report);
            let moves = self.move_calculation_phase(state, tick, &mut blocked, &mut report);
            self.move_application_phase(state, tick, &moves, &mut report);
            self.conflict_phase(state, tick, combat, &mut report);
        }

        self.end_of_turn_phase(state, &mut report);
        production.process(state);

        state.turn += 1;
        report.state_hash = state.state_hash();

        #[cfg(feature = "debug-validation")]
        validate_ownership(state);

        tracing::trace!(
            turn = report.turn,
            state_hash = report.state_hash,
            events = report.events.len(),
            "Turn processed"
        );

        report
    }

    /// Phase 1: merge fleets whose join target is already on their hex.
    fn instant_join_phase(&self, state: &mut GameState, report: &mut TurnReport) {
        for id in state.fleets.sorted_ids() {
            let Some(Order::JoinFleet(target)) =
                state.fleet(id).and_then(|f| f.orders.current().copied())
            else {
                continue;
            };
            join_fleet(state, id, target, false, report);
        }
    }

    /// Phase 2: decide every due fleet's next hex without moving anyone.
    ///
    /// All plans are made against the same view of the state; order and
    /// path bookkeeping is applied only once every fleet has planned. The
    /// chosen hex stays at the front of the path until phase 3.
    fn move_calculation_phase(
        &self,
        state: &mut GameState,
        tick: u32,
        blocked: &mut BTreeSet<FleetId>,
        report: &mut TurnReport,
    ) -> Vec<(FleetId, HexCoord)> {
        let plans: Vec<(FleetId, MovePlan)> = {
            let view = state.view(&self.config);
            state
                .fleets
                .sorted_ids()
                .into_iter()
                .filter_map(|id| {
                    let fleet = view.fleets.get(id)?;
                    self.is_move_tick(fleet, tick)
                        .then(|| (id, self.plan_move(fleet, &view)))
                })
                .collect()
        };

        let mut moves = Vec::new();

        for (id, plan) in plans {
            let Some(fleet) = state.fleets.get_mut(id) else {
                continue;
            };

            match plan {
                MovePlan::Idle => {}
                MovePlan::Cancel(order, reason) => {
                    fleet.finish_order();
                    tracing::debug!(fleet = %id, ?order, %reason, "Order cancelled");
                    report.events.push(TurnEvent::OrderResolved {
                        fleet: id,
                        order,
                        outcome: OrderOutcome::Cancelled(reason),
                    });
                }
                MovePlan::Arrived(order) => {
                    fleet.finish_order();
                    report.events.push(TurnEvent::OrderResolved {
                        fleet: id,
                        order,
                        outcome: OrderOutcome::Completed,
                    });
                }
                MovePlan::Blocked(order) => {
                    fleet.path.clear();
                    if blocked.insert(id) {
                        tracing::debug!(fleet = %id, ?order, "No route to destination");
                        report.events.push(TurnEvent::OrderResolved {
                            fleet: id,
                            order,
                            outcome: OrderOutcome::Pending,
                        });
                    }
                }
                MovePlan::Advance(reroute) => {
                    if let Some(route) = reroute {
                        fleet.set_path(route);
                        tracing::debug!(
                            fleet = %id,
                            destination = ?fleet.path_destination(),
                            steps = fleet.path.len(),
                            "Path recomputed"
                        );
                    }
                    if let Some(&next) = fleet.path.front() {
                        moves.push((id, next));
                    }
                }
            }
        }

        moves
    }

    fn is_move_tick(&self, fleet: &Fleet, tick: u32) -> bool {
        fleet
            .move_interval(self.config.sub_ticks_per_turn)
            .is_some_and(|interval| tick % interval == 0)
    }

    fn plan_move(&self, fleet: &Fleet, view: &WorldView<'_>) -> MovePlan {
        let Some(order) = fleet.orders.current().copied() else {
            return MovePlan::Idle;
        };

        let depth = self.config.intercept.max_pursuit_depth;
        let destination = match resolve_target(&order, fleet, view, depth) {
            Target::Static => return MovePlan::Idle,
            Target::Invalid(reason) => return MovePlan::Cancel(order, reason),
            Target::Reach(hex) => hex,
        };

        if destination == fleet.location {
            return MovePlan::Arrived(order);
        }
        if fleet.path_destination() == Some(destination) {
            return MovePlan::Advance(None);
        }

        match hybrid_path(view.galaxy, fleet.location, destination, &view.config.path) {
            Some(route) => MovePlan::Advance(Some(route)),
            None => MovePlan::Blocked(order),
        }
    }

    /// Phase 3: apply all collected moves simultaneously.
    fn move_application_phase(
        &self,
        state: &mut GameState,
        tick: u32,
        moves: &[(FleetId, HexCoord)],
        report: &mut TurnReport,
    ) {
        for &(id, next) in moves {
            let Some(fleet) = state.fleets.get_mut(id) else {
                continue;
            };

            fleet.path.pop_front();
            let from = fleet.location;
            fleet.location = next;
            report.events.push(TurnEvent::Moved {
                tick,
                fleet: id,
                from,
                to: next,
                warp_jump: is_warp_jump(from, next),
            });

            if fleet.path.is_empty() {
                if let Some(order) = fleet.finish_order() {
                    report.events.push(TurnEvent::OrderResolved {
                        fleet: id,
                        order,
                        outcome: OrderOutcome::Completed,
                    });
                }
            }
        }
    }

    /// Phase 4: resolve every hex held by more than one empire.
    fn conflict_phase<C>(
        &self,
        state: &mut GameState,
        tick: u32,
        combat: &mut C,
        report: &mut TurnReport,
    ) where
        C: CombatResolver + ?Sized,
    {
        let mut occupants: BTreeMap<HexCoord, Vec<(EmpireId, FleetId)>> = BTreeMap::new();
        for id in state.fleets.sorted_ids() {
            if let Some(fleet) = state.fleet(id) {
                occupants
                    .entry(fleet.location)
                    .or_default()
                    .push((fleet.owner, id));
            }
        }

        for (hex, present) in occupants {
            let empires: BTreeSet<EmpireId> = present.iter().map(|&(empire, _)| empire).collect();
            if empires.len() > 1 {
                resolve_contested_hex(state, hex, tick, combat, report);
            }
        }
    }

    /// Resolve `Colonize` and late `JoinFleet` orders at the end of a turn.
    fn end_of_turn_phase(&self, state: &mut GameState, report: &mut TurnReport) {
        for id in state.fleets.sorted_ids() {
            let Some(order) = state.fleet(id).and_then(|f| f.orders.current().copied()) else {
                continue;
            };
            match order {
                Order::Colonize(target) => colonize(state, id, target, report),
                Order::JoinFleet(target) => join_fleet(state, id, target, true, report),
                Order::Move(_) | Order::MoveToFleet(_) => {}
            }
        }
    }
}

/// Run encounters at `hex` until at most one empire has fleets there.
fn resolve_contested_hex<C>(
    state: &mut GameState,
    hex: HexCoord,
    tick: u32,
    combat: &mut C,
    report: &mut TurnReport,
) where
    C: CombatResolver + ?Sized,
{
    loop {
        let present = state.fleets_at(hex);
        let Some(&first) = present.first() else {
            return;
        };
        let Some(first_owner) = state.fleet(first).map(|f| f.owner) else {
            return;
        };
        let Some(opponent) = present
            .iter()
            .copied()
            .find(|&id| state.fleet(id).is_some_and(|f| f.owner != first_owner))
        else {
            return;
        };

        let (Some(a), Some(b)) = (state.fleet(first), state.fleet(opponent)) else {
            return;
        };
        let reported = combat.resolve_encounter(a, b);
        let (winner, loser) = if reported == opponent {
            (opponent, first)
        } else {
            (first, opponent)
        };

        state.destroy_fleet(loser);
        tracing::info!(%hex, %winner, %loser, "Combat resolved");
        report.events.push(TurnEvent::Combat {
            tick,
            hex,
            winner,
            loser,
        });
    }
}

/// Merge `source` into `target` if they share a hex.
///
/// With `final_check` set, a join that is still not co-located is cancelled
/// instead of left pending.
fn join_fleet(
    state: &mut GameState,
    source: FleetId,
    target: FleetId,
    final_check: bool,
    report: &mut TurnReport,
) {
    let Some(src) = state.fleet(source) else {
        return;
    };
    let order = Order::JoinFleet(target);

    let outcome = match state.fleet(target) {
        None => OrderOutcome::Cancelled(CancelReason::TargetFleetLost),
        Some(dst) if dst.id == source || dst.owner != src.owner => {
            OrderOutcome::Cancelled(CancelReason::InvalidTarget)
        }
        Some(dst) if dst.location == src.location => OrderOutcome::Completed,
        Some(_) if final_check => OrderOutcome::Cancelled(CancelReason::NotCoLocated),
        Some(_) => return,
    };

    if outcome == OrderOutcome::Completed {
        if let Some(mut absorbed) = state.destroy_fleet(source) {
            absorbed.clear_orders();
            if let Some(dst) = state.fleets.get_mut(target) {
                dst.ships.append(&mut absorbed.ships);
                tracing::info!(%source, %target, ships = dst.ships.len(), "Fleets merged");
            }
        }
        report.events.push(TurnEvent::FleetJoined { source, target });
    } else if let Some(fleet) = state.fleets.get_mut(source) {
        fleet.finish_order();
    }

    report.events.push(TurnEvent::OrderResolved {
        fleet: source,
        order,
        outcome,
    });
}

/// Settle a planet with a colony fleet, consuming the fleet.
///
/// The planet must be unowned and on the fleet's hex. Any failure drops
/// the order without retry.
fn colonize(state: &mut GameState, id: FleetId, target: Option<PlanetId>, report: &mut TurnReport) {
    let Some(fleet) = state.fleet(id) else {
        return;
    };
    let (empire, location) = (fleet.owner, fleet.location);

    let chosen = match target {
        Some(planet) => match state.galaxy.planet(planet) {
            None => Err(CancelReason::PlanetMissing),
            Some((system, p)) if system.planet_global_location(p) != location => {
                Err(CancelReason::NotCoLocated)
            }
            Some((_, p)) if p.owner.is_some() => Err(CancelReason::PlanetOwned),
            Some(_) => Ok(planet),
        },
        None => state
            .galaxy
            .planets_at(location)
            .into_iter()
            .find(|p| p.owner.is_none())
            .map(|p| p.id)
            .ok_or(CancelReason::NoUnownedPlanet),
    };

    let order = Order::Colonize(target);
    let outcome = match chosen {
        Ok(planet) => {
            if let Some(p) = state.galaxy.planet_mut(planet) {
                p.owner = Some(empire);
                tracing::info!(fleet = %id, %empire, planet = %p.name, "Planet colonized");
            }
            state.destroy_fleet(id);
            report.events.push(TurnEvent::PlanetColonized {
                fleet: id,
                empire,
                planet,
            });
            OrderOutcome::Completed
        }
        Err(reason) => {
            if let Some(fleet) = state.fleets.get_mut(id) {
                fleet.finish_order();
            }
            tracing::debug!(fleet = %id, %reason, "Colonization failed");
            OrderOutcome::Cancelled(reason)
        }
    };

    report.events.push(TurnEvent::OrderResolved {
        fleet: id,
        order,
        outcome,
    });
}

/// Every fleet is listed by exactly its owning empire.
#[cfg(feature = "debug-validation")]
fn validate_ownership(state: &GameState) {
    for fleet in state.fleets.iter() {
        debug_assert!(
            state.empire(fleet.owner).is_some_and(|e| e.owns(fleet.id)),
            "{} missing from {}",
            fleet.id,
            fleet.owner
        );
    }
    for empire in state.empires.values() {
        for id in empire.fleets() {
            debug_assert!(state.fleets.contains(id), "{} lists destroyed {id}", empire.id);
        }
    }
}
