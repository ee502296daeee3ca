//! Error types for the fleet movement core.
//!
//! Only setup and IO surfaces return these. A turn in progress never fails;
//! order problems are reported as [`crate::fleet::OrderOutcome`] values.

use thiserror::Error;

use crate::fleet::FleetId;
use crate::galaxy::SystemId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all fleet movement errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Fleet handle does not resolve to a live fleet.
    #[error("Fleet not found: {0}")]
    FleetNotFound(FleetId),

    /// System identifier does not exist in the galaxy.
    #[error("Star system not found: {0}")]
    SystemNotFound(SystemId),

    /// Empire identifier is not registered.
    #[error("Empire not found: {0}")]
    EmpireNotFound(u32),

    /// Two systems cannot be linked.
    #[error("Invalid warp link between {a} and {b}: {reason}")]
    InvalidLink {
        /// First system.
        a: SystemId,
        /// Second system.
        b: SystemId,
        /// Why the link was rejected.
        reason: String,
    },

    /// Scenario or data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Scenario content is inconsistent.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Desync detected while replaying a recorded game.
    #[error("Desync at turn {turn}: expected hash {expected_hash}, replayed {actual_hash}")]
    DesyncDetected {
        /// Turn where the desync was observed.
        turn: u64,
        /// Recorded state hash.
        expected_hash: u64,
        /// Hash produced by the replay.
        actual_hash: u64,
    },
}
