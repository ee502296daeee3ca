//! Production seam, run once per turn after all sub-ticks.

use crate::state::GameState;

/// Per-turn production step supplied by the host.
pub trait ProductionProcessor {
    /// Run production for all empires. Called once per turn.
    fn process(&mut self, state: &mut GameState);
}

/// Production that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProduction;

impl ProductionProcessor for NoProduction {
    fn process(&mut self, _state: &mut GameState) {}
}
