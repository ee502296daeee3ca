//! Routing across local hex space and the interstellar warp graph.
//!
//! Everything here is a pure query against a [`Galaxy`] snapshot. Preview
//! callers may run these concurrently; the turn scheduler calls them while
//! it holds exclusive access to the game state.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::config::PathConfig;
use crate::galaxy::{Galaxy, SystemId};
use crate::hex::HexCoord;

/// Straight hex line from `start` to `end`, both inclusive.
///
/// Local space has no obstacles, so the line is the route.
#[must_use]
pub fn local_path(start: HexCoord, end: HexCoord) -> Vec<HexCoord> {
    start.line(end)
}

/// Number of hops in a route (one less than the number of hexes).
#[must_use]
pub fn path_length(path: &[HexCoord]) -> u32 {
    path.len().saturating_sub(1) as u32
}

/// True when a single step covers more than one hex, i.e. a warp jump.
#[must_use]
pub fn is_warp_jump(from: HexCoord, to: HexCoord) -> bool {
    from.distance(to) > 1
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct SearchNode {
    system: SystemId,
    /// f_score = g_score + heuristic
    f_score: u32,
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for lowest f_score first.
        match other.f_score.cmp(&self.f_score) {
            // Deterministic tie-breaking: prefer the lower system id.
            Ordering::Equal => other.system.cmp(&self.system),
            ord => ord,
        }
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest system sequence from `from` to `to` over the warp graph.
///
/// Edge weight is the hex distance between system centres and the
/// heuristic is the straight hex distance to the goal, which never
/// overestimates. The result includes both ends. Returns `None` if either
/// system is unknown or the two are not connected.
#[must_use]
pub fn interstellar_path(from: SystemId, to: SystemId, galaxy: &Galaxy) -> Option<Vec<SystemId>> {
    let goal = galaxy.system(to)?.global_location;
    let origin = galaxy.system(from)?;
    if from == to {
        return Some(vec![from]);
    }

    let mut open_set: BinaryHeap<SearchNode> = BinaryHeap::new();
    let mut came_from: HashMap<SystemId, SystemId> = HashMap::new();
    let mut g_score: HashMap<SystemId, u32> = HashMap::new();

    g_score.insert(from, 0);
    open_set.push(SearchNode {
        system: from,
        f_score: origin.global_location.distance(goal),
    });

    while let Some(current) = open_set.pop() {
        if current.system == to {
            return Some(reconstruct_path(&came_from, to));
        }

        let Some(here) = galaxy.system(current.system) else {
            continue;
        };
        let current_g = g_score.get(&current.system).copied().unwrap_or(u32::MAX);

        for warp in &here.warp_points {
            let Some(next) = galaxy.system(warp.destination) else {
                continue;
            };

            let tentative_g =
                current_g.saturating_add(here.global_location.distance(next.global_location));
            let neighbor_g = g_score.get(&next.id).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(next.id, here.id);
                g_score.insert(next.id, tentative_g);
                open_set.push(SearchNode {
                    system: next.id,
                    f_score: tentative_g.saturating_add(next.global_location.distance(goal)),
                });
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<SystemId, SystemId>, goal: SystemId) -> Vec<SystemId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Full route between two global hexes, warping between systems as needed.
///
/// Each hex is assigned to its owning system. Within one system the route
/// is a straight line. Otherwise the route follows [`interstellar_path`]:
/// a line to the warp point leading onward, a single jump to the reciprocal
/// warp point on the far side, and so on, finishing with a line to `end`.
///
/// The route starts with `start`. Returns `None` if the owning systems are
/// not connected.
#[must_use]
pub fn hybrid_path(
    galaxy: &Galaxy,
    start: HexCoord,
    end: HexCoord,
    config: &PathConfig,
) -> Option<Vec<HexCoord>> {
    let (Some(start_sys), Some(end_sys)) = (
        galaxy.owning_system(start, config.system_radius),
        galaxy.owning_system(end, config.system_radius),
    ) else {
        return Some(local_path(start, end));
    };
    if start_sys.id == end_sys.id {
        return Some(local_path(start, end));
    }

    let systems = interstellar_path(start_sys.id, end_sys.id, galaxy)?;

    let mut route = vec![start];
    let mut cursor = start;

    for pair in systems.windows(2) {
        let (Some(here), Some(next)) = (galaxy.system(pair[0]), galaxy.system(pair[1])) else {
            return None;
        };

        if let Some(exit) = here.warp_point_to(next.id) {
            let exit_hex = exit.global_location(here);
            extend_line(&mut route, cursor, exit_hex);
            cursor = exit_hex;
        }

        let arrival = match next.warp_point_to(here.id) {
            Some(entry) => entry.global_location(next),
            None => {
                tracing::warn!(
                    from = %here.name,
                    to = %next.name,
                    "Missing reciprocal warp point, jumping to system centre"
                );
                next.global_location
            }
        };
        if arrival != cursor {
            route.push(arrival);
            cursor = arrival;
        }
    }

    extend_line(&mut route, cursor, end);
    Some(route)
}

/// Append the line from `from` to `to`, skipping `from` itself.
fn extend_line(route: &mut Vec<HexCoord>, from: HexCoord, to: HexCoord) {
    route.extend(local_path(from, to).into_iter().skip(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(q: i32, r: i32) -> HexCoord {
        HexCoord::new(q, r)
    }

    /// Sol(0,0) -- Vega(20,0) -- Rigel(40,0), plus an isolated Deneb(0,40).
    fn chain() -> (Galaxy, [SystemId; 4]) {
        let mut galaxy = Galaxy::new();
        let sol = galaxy.add_system("Sol", hex(0, 0)).unwrap();
        let vega = galaxy.add_system("Vega", hex(20, 0)).unwrap();
        let rigel = galaxy.add_system("Rigel", hex(40, 0)).unwrap();
        let deneb = galaxy.add_system("Deneb", hex(0, 40)).unwrap();
        galaxy.link(sol, vega, hex(3, 0), hex(-3, 0)).unwrap();
        galaxy.link(vega, rigel, hex(3, 0), hex(-3, 0)).unwrap();
        (galaxy, [sol, vega, rigel, deneb])
    }

    #[test]
    fn test_local_path_is_line() {
        assert_eq!(local_path(hex(0, 0), hex(2, 0)), vec![hex(0, 0), hex(1, 0), hex(2, 0)]);
        assert_eq!(local_path(hex(1, 1), hex(1, 1)), vec![hex(1, 1)]);
    }

    #[test]
    fn test_interstellar_chain() {
        let (galaxy, [sol, vega, rigel, _]) = chain();
        assert_eq!(
            interstellar_path(sol, rigel, &galaxy),
            Some(vec![sol, vega, rigel])
        );
        assert_eq!(interstellar_path(vega, vega, &galaxy), Some(vec![vega]));
    }

    #[test]
    fn test_interstellar_disconnected() {
        let (galaxy, [sol, _, _, deneb]) = chain();
        assert_eq!(interstellar_path(sol, deneb, &galaxy), None);
        assert_eq!(interstellar_path(sol, SystemId(99), &galaxy), None);
    }

    #[test]
    fn test_interstellar_prefers_shorter_total_distance() {
        let mut galaxy = Galaxy::new();
        let a = galaxy.add_system("A", hex(0, 0)).unwrap();
        let far = galaxy.add_system("Far", hex(0, 30)).unwrap();
        let near = galaxy.add_system("Near", hex(10, 0)).unwrap();
        let b = galaxy.add_system("B", hex(20, 0)).unwrap();
        galaxy.link(a, far, hex(1, 0), hex(-1, 0)).unwrap();
        galaxy.link(far, b, hex(1, 0), hex(-1, 0)).unwrap();
        galaxy.link(a, near, hex(2, 0), hex(-2, 0)).unwrap();
        galaxy.link(near, b, hex(2, 0), hex(-2, 0)).unwrap();

        assert_eq!(interstellar_path(a, b, &galaxy), Some(vec![a, near, b]));
    }

    #[test]
    fn test_hybrid_path_same_system() {
        let (galaxy, _) = chain();
        let route = hybrid_path(&galaxy, hex(-2, 0), hex(2, 0), &PathConfig::default()).unwrap();
        assert_eq!(route, local_path(hex(-2, 0), hex(2, 0)));
    }

    #[test]
    fn test_hybrid_path_warps_between_systems() {
        let (galaxy, _) = chain();
        let route = hybrid_path(&galaxy, hex(0, 0), hex(21, 0), &PathConfig::default()).unwrap();

        // Line to Sol's warp point at (3,0), jump to Vega's at (17,0), line to (21,0).
        assert_eq!(
            route,
            vec![
                hex(0, 0),
                hex(1, 0),
                hex(2, 0),
                hex(3, 0),
                hex(17, 0),
                hex(18, 0),
                hex(19, 0),
                hex(20, 0),
                hex(21, 0),
            ]
        );
        let jumps = route.windows(2).filter(|w| is_warp_jump(w[0], w[1])).count();
        assert_eq!(jumps, 1);
        assert_eq!(path_length(&route), 8);
    }

    #[test]
    fn test_hybrid_path_two_jumps() {
        let (galaxy, _) = chain();
        let route = hybrid_path(&galaxy, hex(0, 0), hex(40, 0), &PathConfig::default()).unwrap();
        assert_eq!(route.first(), Some(&hex(0, 0)));
        assert_eq!(route.last(), Some(&hex(40, 0)));
        let jumps: Vec<_> = route
            .windows(2)
            .filter(|w| is_warp_jump(w[0], w[1]))
            .map(|w| (w[0], w[1]))
            .collect();
        assert_eq!(jumps, vec![(hex(3, 0), hex(17, 0)), (hex(23, 0), hex(37, 0))]);
    }

    #[test]
    fn test_hybrid_path_unreachable() {
        let (galaxy, _) = chain();
        assert!(hybrid_path(&galaxy, hex(0, 0), hex(0, 40), &PathConfig::default()).is_none());
    }

    #[test]
    fn test_hybrid_path_empty_galaxy_is_local() {
        let galaxy = Galaxy::new();
        let route = hybrid_path(&galaxy, hex(0, 0), hex(3, -3), &PathConfig::default()).unwrap();
        assert_eq!(route, local_path(hex(0, 0), hex(3, -3)));
    }

    #[test]
    fn test_missing_reciprocal_jumps_to_centre() {
        let (mut galaxy, [sol, vega, _, _]) = chain();
        galaxy
            .system_mut(vega)
            .unwrap()
            .warp_points
            .retain(|wp| wp.destination != sol);

        let route = hybrid_path(&galaxy, hex(0, 0), hex(21, 0), &PathConfig::default()).unwrap();
        assert_eq!(&route[..5], &[hex(0, 0), hex(1, 0), hex(2, 0), hex(3, 0), hex(20, 0)]);
        assert_eq!(route.last(), Some(&hex(21, 0)));
    }

    #[test]
    fn test_determinism() {
        let (galaxy, _) = chain();
        let cfg = PathConfig::default();
        let a = hybrid_path(&galaxy, hex(-4, 2), hex(38, 3), &cfg);
        let b = hybrid_path(&galaxy, hex(-4, 2), hex(38, 3), &cfg);
        assert_eq!(a, b);
    }
}
