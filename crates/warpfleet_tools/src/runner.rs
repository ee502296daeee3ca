//! Scenario runner and route inspection.
//!
//! Runs a loaded scenario for a number of turns and summarizes what
//! happened, or answers routing questions against its galaxy without
//! advancing the game.

use rayon::prelude::*;
use serde::Serialize;
use warpfleet_core::combat::LargestFleetWins;
use warpfleet_core::fleet::FleetId;
use warpfleet_core::hex::HexCoord;
use warpfleet_core::pathfinding::{hybrid_path, is_warp_jump};
use warpfleet_core::production::NoProduction;
use warpfleet_core::projection::{project_path, ProjectedStep};
use warpfleet_core::scenario::Scenario;
use warpfleet_core::scheduler::{TurnEvent, TurnReport, TurnScheduler};

use crate::error::{ToolError, ToolResult};

/// Parse a hex written as `q,r`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArgument`] if the text is not two integers
/// separated by a comma.
pub fn parse_hex(text: &str) -> ToolResult<HexCoord> {
    let invalid = || ToolError::InvalidArgument(format!("expected q,r but got '{text}'"));
    let (q, r) = text.split_once(',').ok_or_else(invalid)?;
    let q = q.trim().parse().map_err(|_| invalid())?;
    let r = r.trim().parse().map_err(|_| invalid())?;
    Ok(HexCoord::new(q, r))
}

/// Where a fleet ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Fleet id.
    pub id: FleetId,
    /// Fleet name.
    pub name: String,
    /// Owning empire.
    pub owner: u32,
    /// Final location.
    pub location: HexCoord,
    /// Orders still queued.
    pub orders_left: usize,
}

/// Outcome of running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// Turns processed.
    pub turns: u64,
    /// Hash of the final state.
    pub final_hash: u64,
    /// Per-turn reports.
    pub reports: Vec<TurnReport>,
    /// Surviving fleets, by id.
    pub fleets: Vec<FleetSummary>,
}

impl RunSummary {
    /// Total combat encounters across all turns.
    #[must_use]
    pub fn combat_count(&self) -> usize {
        self.reports.iter().map(TurnReport::combat_count).sum()
    }
}

/// Run `scenario` for `turns` turns with the default combat resolver.
#[must_use]
pub fn run_scenario(scenario: &Scenario, turns: u64) -> RunSummary {
    let scheduler = TurnScheduler::new(scenario.config);
    let mut state = scenario.state.clone();
    let mut reports = Vec::new();

    for _ in 0..turns {
        let report = scheduler.process_turn(&mut state, &mut LargestFleetWins, &mut NoProduction);
        let moves = report
            .events
            .iter()
            .filter(|e| matches!(e, TurnEvent::Moved { .. }))
            .count();
        tracing::info!(
            turn = report.turn,
            moves,
            combats = report.combat_count(),
            hash = report.state_hash,
            "Turn complete"
        );
        reports.push(report);
    }

    let fleets = state
        .fleets
        .sorted_ids()
        .into_iter()
        .filter_map(|id| state.fleet(id))
        .map(|fleet| FleetSummary {
            id: fleet.id,
            name: fleet.name.clone(),
            owner: fleet.owner.0,
            location: fleet.location,
            orders_left: fleet.orders.len(),
        })
        .collect();

    RunSummary {
        scenario: scenario.name.clone(),
        turns,
        final_hash: state.state_hash(),
        reports,
        fleets,
    }
}

/// A routed path between two hexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    /// Hexes visited, starting hex included.
    pub hexes: Vec<HexCoord>,
    /// Number of warp jumps along the route.
    pub warp_jumps: usize,
}

/// Route between two hexes in the scenario's galaxy.
///
/// Returns `None` when the owning systems are not connected.
#[must_use]
pub fn route(scenario: &Scenario, from: HexCoord, to: HexCoord) -> Option<RouteSummary> {
    let hexes = hybrid_path(&scenario.state.galaxy, from, to, &scenario.config.path)?;
    let warp_jumps = hexes.windows(2).filter(|p| is_warp_jump(p[0], p[1])).count();
    Some(RouteSummary { hexes, warp_jumps })
}

/// Projected movement of one fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetPreview {
    /// Fleet id.
    pub id: FleetId,
    /// Fleet name.
    pub name: String,
    /// Projected steps.
    pub steps: Vec<ProjectedStep>,
}

/// Project every fleet's next `turns` turns, fleets in parallel.
#[must_use]
pub fn preview(scenario: &Scenario, turns: u32) -> Vec<FleetPreview> {
    let state = &scenario.state;
    let view = state.view(&scenario.config);

    state
        .fleets
        .sorted_ids()
        .into_par_iter()
        .filter_map(|id| state.fleet(id))
        .map(|fleet| FleetPreview {
            id: fleet.id,
            name: fleet.name.clone(),
            steps: project_path(fleet, &view, turns),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use warpfleet_core::config::SimConfig;
    use warpfleet_test_utils::fixtures::{chain_galaxy, hex, skirmish_state, two_empire_state};

    fn scenario(state: warpfleet_core::state::GameState) -> Scenario {
        Scenario {
            name: "fixture".into(),
            config: SimConfig::default(),
            state,
            fleets_by_name: BTreeMap::new(),
        }
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("3,-2").unwrap(), hex(3, -2));
        assert_eq!(parse_hex(" -1 , 4 ").unwrap(), hex(-1, 4));
        assert!(matches!(parse_hex("3"), Err(ToolError::InvalidArgument(_))));
        assert!(matches!(parse_hex("a,b"), Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_run_is_reproducible() {
        let skirmish = scenario(skirmish_state());
        let first = run_scenario(&skirmish, 4);
        let second = run_scenario(&skirmish, 4);

        assert_eq!(first.reports.len(), 4);
        assert_eq!(first.final_hash, second.final_hash);
        assert_eq!(first.fleets, second.fleets);
    }

    #[test]
    fn test_route_counts_jumps() {
        let chain = scenario(two_empire_state(chain_galaxy()));
        let summary = route(&chain, hex(0, 0), hex(42, 0)).unwrap();
        assert_eq!(summary.warp_jumps, 2);
        assert_eq!(summary.hexes.first(), Some(&hex(0, 0)));
        assert_eq!(summary.hexes.last(), Some(&hex(42, 0)));
    }

    #[test]
    fn test_preview_covers_every_fleet() {
        let skirmish = scenario(skirmish_state());
        let previews = preview(&skirmish, 3);
        assert_eq!(previews.len(), skirmish.state.fleets.len());
        assert!(previews.windows(2).all(|w| w[0].id < w[1].id));
        assert!(previews.iter().any(|p| !p.steps.is_empty()));
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = run_scenario(&scenario(skirmish_state()), 1);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"scenario\":\"fixture\""));
    }
}
