//! # Warpfleet Core
//!
//! Deterministic fleet movement core for a hex-grid space strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No system randomness
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! File IO is limited to loading scenarios and saving replays.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial hex coordinates, distance, and line drawing
//! - [`galaxy`] - Star systems, planets, and warp links
//! - [`pathfinding`] - Local lines, interstellar A*, and hybrid routes
//! - [`projection`] - Turn-by-turn path projection
//! - [`intercept`] - Pursuit intercept points
//! - [`scheduler`] - Sub-tick turn processing
//! - [`scenario`] - RON scenario loading
//! - [`replay`] - Recorded games and desync checks

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod config;
pub mod empire;
pub mod error;
pub mod fleet;
pub mod galaxy;
pub mod hex;
pub mod intercept;
pub mod math;
pub mod pathfinding;
pub mod production;
pub mod projection;
pub mod replay;
pub mod scenario;
pub mod scheduler;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{CombatResolver, LargestFleetWins};
    pub use crate::config::{InterceptConfig, PathConfig, SimConfig};
    pub use crate::empire::{Empire, EmpireId};
    pub use crate::error::{GameError, Result};
    pub use crate::fleet::{CancelReason, Fleet, FleetId, Order, OrderOutcome, Ship};
    pub use crate::galaxy::{Galaxy, Planet, PlanetId, StarSystem, SystemId};
    pub use crate::hex::HexCoord;
    pub use crate::intercept::intercept;
    pub use crate::math::Fixed;
    pub use crate::pathfinding::{hybrid_path, interstellar_path, local_path, path_length};
    pub use crate::production::{NoProduction, ProductionProcessor};
    pub use crate::projection::{project_path, ProjectedStep};
    pub use crate::scenario::{Scenario, ScenarioData};
    pub use crate::scheduler::{TurnEvent, TurnReport, TurnScheduler};
    pub use crate::state::{GameState, WorldView};
}
