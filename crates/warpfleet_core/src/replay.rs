//! Replay system for recording and verifying games.
//!
//! A replay stores the initial game state and every order issued, keyed by
//! the turn it was issued on. Because turns are deterministic, re-running
//! the orders through a [`TurnScheduler`] must reproduce the final hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::CombatResolver;
use crate::error::{GameError, Result};
use crate::fleet::{FleetId, Order};
use crate::production::ProductionProcessor;
use crate::scheduler::TurnScheduler;
use crate::state::GameState;

/// A single order record for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOrder {
    /// Turn on which the order was issued (before processing).
    pub turn: u64,
    /// Fleet that received the order.
    pub fleet: FleetId,
    /// The order.
    pub order: Order,
    /// True if the order replaced the queue, false if it was appended.
    pub replace: bool,
}

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Serialized initial game state.
    pub initial_state: Vec<u8>,
    /// Orders in the order they were issued.
    pub orders: Vec<ReplayOrder>,
    /// Turn counter when the game ended.
    pub final_turn: u64,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from the current state.
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn new(scenario_id: impl Into<String>, initial_state: &GameState) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            initial_state: initial_state.serialize()?,
            orders: Vec::new(),
            final_turn: initial_state.turn,
            final_hash: initial_state.state_hash(),
        })
    }

    /// Record an order for replay.
    pub fn record_order(&mut self, turn: u64, fleet: FleetId, order: Order, replace: bool) {
        self.orders.push(ReplayOrder {
            turn,
            fleet,
            order,
            replace,
        });
    }

    /// Finalize the replay with end-game state.
    pub fn finalize(&mut self, state: &GameState) {
        self.final_turn = state.turn;
        self.final_hash = state.state_hash();
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading, deserialization, or the version
    /// check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {}, got {}",
                REPLAY_VERSION, replay.version
            )));
        }

        Ok(replay)
    }

    /// Get the initial game state for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<GameState> {
        GameState::deserialize(&self.initial_state)
    }

    /// Orders issued on a specific turn.
    pub fn orders_at_turn(&self, turn: u64) -> impl Iterator<Item = &ReplayOrder> {
        self.orders.iter().filter(move |o| o.turn == turn)
    }

    /// Re-run the game and check that it ends on the recorded hash.
    ///
    /// # Errors
    /// Returns [`GameError::DesyncDetected`] if the final hash differs, or
    /// [`GameError::FleetNotFound`] if a recorded order targets a fleet
    /// that does not exist at that point of the replay.
    pub fn verify<C, P>(
        &self,
        scheduler: &TurnScheduler,
        combat: &mut C,
        production: &mut P,
    ) -> Result<GameState>
    where
        C: CombatResolver + ?Sized,
        P: ProductionProcessor + ?Sized,
    {
        let mut state = self.restore_initial_state()?;

        while state.turn < self.final_turn {
            for record in self.orders_at_turn(state.turn) {
                if record.replace {
                    state.issue_order(record.fleet, record.order)?;
                } else {
                    state.queue_order(record.fleet, record.order)?;
                }
            }
            scheduler.process_turn(&mut state, combat, production);
        }

        let actual_hash = state.state_hash();
        if actual_hash != self.final_hash {
            return Err(GameError::DesyncDetected {
                turn: state.turn,
                expected_hash: self.final_hash,
                actual_hash,
            });
        }

        tracing::debug!(turns = self.final_turn, hash = actual_hash, "Replay verified");
        Ok(state)
    }
}
