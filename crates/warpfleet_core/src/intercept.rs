//! Interception: where should a pursuer head to meet a moving fleet?
//!
//! The target's future track is projected turn by turn. Each point is
//! tested in ascending turn order against the pursuer's real routed
//! distance, including warp jumps, and the first point the pursuer can
//! reach no later than the target wins. This is the earliest point on
//! the target's track that is reachable in time; it is not necessarily
//! the point the pursuer itself reaches soonest.

use crate::fleet::Fleet;
use crate::hex::HexCoord;
use crate::math::Fixed;
use crate::pathfinding::{hybrid_path, path_length};
use crate::projection::{project_at_depth, ProjectedStep};
use crate::state::WorldView;

/// Hex a `chaser` should head for to meet `target`.
///
/// Falls back to the last projected point when nothing on the track is
/// reachable in time, and to the target's current location when the
/// target is not going anywhere.
#[must_use]
pub fn intercept(chaser: &Fleet, target: &Fleet, view: &WorldView<'_>) -> HexCoord {
    intercept_at_depth(chaser, target, view, view.config.intercept.max_pursuit_depth)
}

pub(crate) fn intercept_at_depth(
    chaser: &Fleet,
    target: &Fleet,
    view: &WorldView<'_>,
    depth: u32,
) -> HexCoord {
    let track = project_at_depth(target, view, view.config.intercept.max_turns, depth);
    let Some(last) = track.last().map(|step| step.hex) else {
        return target.location;
    };

    let start = ProjectedStep {
        hex: target.location,
        turn: 0,
        warp_jump: false,
    };

    for point in std::iter::once(start).chain(track) {
        let Some(route) = hybrid_path(view.galaxy, chaser.location, point.hex, &view.config.path)
        else {
            continue;
        };
        if can_arrive_by(path_length(&route), chaser.speed, point.turn) {
            tracing::trace!(
                chaser = %chaser.id,
                target = %target.id,
                hex = %point.hex,
                turn = point.turn,
                "Intercept point found"
            );
            return point.hex;
        }
    }

    last
}

/// True if `hops` at `speed` hexes per turn take at most `turn` turns.
fn can_arrive_by(hops: u32, speed: Fixed, turn: u32) -> bool {
    if hops == 0 {
        return true;
    }
    if speed <= Fixed::ZERO {
        return false;
    }
    Fixed::from_num(hops)
        .checked_div(speed)
        .is_some_and(|turns| turns <= Fixed::from_num(turn))
}
