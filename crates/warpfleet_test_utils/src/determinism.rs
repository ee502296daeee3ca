//! Determinism testing utilities.
//!
//! Provides a harness for verifying that turn processing produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every client must agree on every fleet position after every turn.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Speeds and line interpolation use
//!   [`warpfleet_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Fleets are always visited in sorted id order.
//!
//! - **Combat resolution**: The resolver is an input. Tests use
//!   [`LargestFleetWins`], which is a pure function of the two fleets.

use std::thread;

use warpfleet_core::combat::LargestFleetWins;
use warpfleet_core::config::SimConfig;
use warpfleet_core::production::NoProduction;
use warpfleet_core::scheduler::TurnScheduler;
use warpfleet_core::state::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns simulated.
    pub turns: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the game was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Turn processing is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a game multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the game
/// * `turns` - Number of turns to process per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance by one turn
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Process one turn with the default combat and production hooks.
pub fn step_turn(scheduler: &TurnScheduler, state: &mut GameState) {
    scheduler.process_turn(state, &mut LargestFleetWins, &mut NoProduction);
}

/// Run a [`GameState`] twice under `config` and compare final hashes.
pub fn verify_game_determinism<F>(setup_fn: F, config: SimConfig, turns: u64) -> DeterminismResult
where
    F: Fn() -> GameState,
{
    let scheduler = TurnScheduler::new(config);
    verify_determinism(
        2,
        turns,
        &setup_fn,
        |state| step_turn(&scheduler, state),
        GameState::state_hash,
    )
}

/// Run `num_games` copies on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_games<F>(
    setup_fn: F,
    config: SimConfig,
    num_games: usize,
    turns: u64,
) -> Vec<u64>
where
    F: Fn() -> GameState + Sync,
{
    let scheduler = TurnScheduler::new(config);
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| {
                s.spawn(|| {
                    let mut state = setup_fn();
                    for _ in 0..turns {
                        step_turn(&scheduler, &mut state);
                    }
                    state.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

/// Compare two runs turn-by-turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(turn)` for the first turn
/// whose resulting hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, config: SimConfig, turns: u64) -> Option<u64>
where
    F: Fn() -> GameState,
{
    let scheduler = TurnScheduler::new(config);
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        step_turn(&scheduler, &mut a);
        step_turn(&scheduler, &mut b);

        if a.state_hash() != b.state_hash() {
            tracing::warn!(turn, "Runs diverged");
            return Some(turn);
        }
    }

    None
}

/// Verify that a save/load round trip mid-game changes nothing afterwards.
///
/// The game runs `turns` turns, is serialized and restored, and then both
/// copies run `turns` more turns.
pub fn verify_serialization_determinism<F>(setup_fn: F, config: SimConfig, turns: u64) -> bool
where
    F: Fn() -> GameState,
{
    let scheduler = TurnScheduler::new(config);
    let mut state = setup_fn();

    for _ in 0..turns {
        step_turn(&scheduler, &mut state);
    }

    let Ok(bytes) = state.serialize() else {
        return false;
    };
    let Ok(mut restored) = GameState::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != state.state_hash() {
        return false;
    }

    for _ in 0..turns {
        step_turn(&scheduler, &mut state);
        step_turn(&scheduler, &mut restored);
    }

    restored.state_hash() == state.state_hash()
}

/// Proptest strategies for hex and fleet inputs.
pub mod strategies {
    use proptest::prelude::*;
    use warpfleet_core::hex::HexCoord;
    use warpfleet_core::math::Fixed;

    /// Generate a hex within `radius` of the origin on both axes.
    pub fn arb_hex(radius: i32) -> impl Strategy<Value = HexCoord> {
        (-radius..=radius, -radius..=radius).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Generate a fleet speed between 1 and 20 hexes per turn, in quarter steps.
    pub fn arb_speed() -> impl Strategy<Value = Fixed> {
        (4i32..=80).prop_map(|quarters| Fixed::from_num(quarters) / Fixed::from_num(4))
    }

    /// Generate a short list of move destinations.
    pub fn arb_waypoints(radius: i32, max_len: usize) -> impl Strategy<Value = Vec<HexCoord>> {
        proptest::collection::vec(arb_hex(radius), 1..max_len)
    }
}
