//! Forward projection of a fleet's track and destination resolution.
//!
//! Projection runs on a clone of the fleet, so the real fleet is never
//! touched. It is the basis of interception: a pursuer asks where its
//! target will be on each future turn.

use serde::{Deserialize, Serialize};

use crate::fleet::{CancelReason, Fleet, Order};
use crate::hex::HexCoord;
use crate::intercept::intercept_at_depth;
use crate::pathfinding::{hybrid_path, is_warp_jump};
use crate::state::WorldView;

/// One predicted step of a fleet's future track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedStep {
    /// Hex entered by this step.
    pub hex: HexCoord,
    /// Whole turns elapsed before this step is taken.
    pub turn: u32,
    /// True when the step crosses a warp link.
    pub warp_jump: bool,
}

/// What an order asks the fleet to travel towards right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// Travel to this hex.
    Reach(HexCoord),
    /// The order can no longer be carried out.
    Invalid(CancelReason),
    /// Not a movement order.
    Static,
}

/// Resolve the destination of a movement order.
///
/// `MoveToFleet` runs the interception solver on every call, so a pursuer
/// re-targets as its quarry moves. At `depth == 0` the quarry's current
/// location is used instead, which bounds mutual pursuit.
pub(crate) fn resolve_target(
    order: &Order,
    fleet: &Fleet,
    view: &WorldView<'_>,
    depth: u32,
) -> Target {
    match *order {
        Order::Move(hex) => Target::Reach(hex),
        Order::MoveToFleet(target_id) => match view.fleets.get(target_id) {
            None => Target::Invalid(CancelReason::TargetFleetLost),
            Some(target) if depth == 0 => Target::Reach(target.location),
            Some(target) => Target::Reach(intercept_at_depth(fleet, target, view, depth - 1)),
        },
        Order::Colonize(_) | Order::JoinFleet(_) => Target::Static,
    }
}

/// Predict where `fleet` will be over the next `max_turns` turns.
///
/// The cached path is consumed first; after that each movement order is
/// resolved and routed with [`hybrid_path`]. `Colonize` and `JoinFleet`
/// orders take no time and are skipped. The fleet covers `floor(speed)`
/// steps per turn, so a speed-2 fleet on a 9-hex path yields turns
/// `0,0,1,1,2,2,3,3,4`. A fleet that cannot move, or has nothing to do,
/// yields an empty projection.
#[must_use]
pub fn project_path(fleet: &Fleet, view: &WorldView<'_>, max_turns: u32) -> Vec<ProjectedStep> {
    project_at_depth(fleet, view, max_turns, view.config.intercept.max_pursuit_depth)
}

pub(crate) fn project_at_depth(
    fleet: &Fleet,
    view: &WorldView<'_>,
    max_turns: u32,
    depth: u32,
) -> Vec<ProjectedStep> {
    let steps_per_turn = fleet.steps_per_turn();
    if steps_per_turn == 0 {
        return Vec::new();
    }

    let mut sim = fleet.clone();
    if let Some(Order::Move(dest)) = sim.orders.current().copied() {
        if sim.path_destination().is_some_and(|end| end != dest) {
            sim.path.clear();
        }
    }

    let mut track = Vec::new();
    let mut taken: u32 = 0;

    loop {
        let turn = taken / steps_per_turn;
        if turn >= max_turns {
            break;
        }

        if sim.path.is_empty() {
            let Some(order) = sim.orders.current().copied() else {
                break;
            };
            match resolve_target(&order, &sim, view, depth) {
                Target::Static | Target::Invalid(_) => {
                    sim.orders.pop();
                    continue;
                }
                Target::Reach(dest) if dest == sim.location => {
                    sim.finish_order();
                    continue;
                }
                Target::Reach(dest) => {
                    let Some(route) =
                        hybrid_path(view.galaxy, sim.location, dest, &view.config.path)
                    else {
                        break;
                    };
                    sim.set_path(route);
                    if sim.path.is_empty() {
                        sim.finish_order();
                        continue;
                    }
                }
            }
        }

        let Some(next) = sim.path.pop_front() else {
            continue;
        };
        track.push(ProjectedStep {
            hex: next,
            turn,
            warp_jump: is_warp_jump(sim.location, next),
        });
        sim.location = next;
        taken += 1;

        if sim.path.is_empty() {
            sim.orders.pop();
        }
    }

    track
}
