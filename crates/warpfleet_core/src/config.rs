//! Tunable simulation parameters.
//!
//! Every field has a default, so scenario files only need to mention the
//! values they change:
//!
//! ```ron
//! SimConfig(
//!     intercept: (max_turns: 20),
//! )
//! ```

use serde::{Deserialize, Serialize};

/// Sub-ticks in one turn.
pub const SUB_TICKS_PER_TURN: u32 = 100;

/// Default radius (in hexes) around a system centre that belongs to it.
pub const DEFAULT_SYSTEM_RADIUS: u32 = 5;

/// Default number of turns a target's track is projected ahead.
pub const DEFAULT_MAX_INTERCEPT_TURNS: u32 = 50;

/// Default nesting limit for pursuit chains (A chases B chases C ...).
pub const DEFAULT_MAX_PURSUIT_DEPTH: u32 = 3;

/// Routing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Hexes within this distance of a system centre belong to that system.
    pub system_radius: u32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            system_radius: DEFAULT_SYSTEM_RADIUS,
        }
    }
}

/// Interception solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptConfig {
    /// How many turns of the target's future track to consider.
    pub max_turns: u32,
    /// How deep pursuit chains are followed while projecting.
    ///
    /// At depth zero a pursued fleet's destination resolves to its current
    /// location, which bounds mutual pursuit.
    pub max_pursuit_depth: u32,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_INTERCEPT_TURNS,
            max_pursuit_depth: DEFAULT_MAX_PURSUIT_DEPTH,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed sub-ticks per turn.
    pub sub_ticks_per_turn: u32,
    /// Routing parameters.
    pub path: PathConfig,
    /// Interception parameters.
    pub intercept: InterceptConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sub_ticks_per_turn: SUB_TICKS_PER_TURN,
            path: PathConfig::default(),
            intercept: InterceptConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: SimConfig = ron::from_str("(intercept: (max_turns: 20))").unwrap();
        assert_eq!(config.sub_ticks_per_turn, 100);
        assert_eq!(config.intercept.max_turns, 20);
        assert_eq!(config.intercept.max_pursuit_depth, DEFAULT_MAX_PURSUIT_DEPTH);
        assert_eq!(config.path.system_radius, DEFAULT_SYSTEM_RADIUS);
    }
}
