//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical results
//! given the same seed, the same real-time deltas and the same commands.
//!
//! # Sources of non-determinism
//!
//! - **Floating-point math**: simulation math uses
//!   [`arena_core::math::Fixed`]; floats only appear in render snapshots.
//! - **Collection order**: units, towers and spells are stored and visited
//!   in creation order.
//! - **Randomness**: every random choice goes through the match's
//!   [`arena_core::rng::RandomSource`], seeded explicitly.

use std::thread;

use arena_core::simulation::Match;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one tick; receives the tick index
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use arena_test_utils::determinism::verify_determinism;
/// use arena_test_utils::fixtures::started_match;
///
/// let result = verify_determinism(
///     5,
///     600,
///     || started_match(42),
///     |game, _| { game.tick(16); },
///     |game| game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a match twice with a fixed frame time and compare final hashes.
pub fn verify_match_determinism<F>(setup_fn: F, num_ticks: u64, frame_ms: u64) -> bool
where
    F: Fn() -> Match,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |game, _| {
            game.tick(frame_ms);
        },
        Match::state_hash,
    )
    .is_deterministic
}

/// Run N matches on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under different thread
/// scheduling or memory layout.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_matches<F>(
    setup_fn: F,
    num_matches: usize,
    num_ticks: u64,
    frame_ms: u64,
) -> DeterminismResult
where
    F: Fn() -> Match + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    for _ in 0..num_ticks {
                        game.tick(frame_ms);
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two match runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` if they first differ
/// after that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, frame_ms: u64) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick(frame_ms);
        second.tick(frame_ms);

        if first.state_hash() != second.state_hash() {
            tracing::warn!(tick, "Matches diverged");
            return Some(tick);
        }
    }

    None
}

/// Proptest strategies for match inputs.
pub mod strategies {
    use arena_core::components::Side;
    use arena_core::simulation::DeployCommand;
    use proptest::prelude::*;

    /// Card ids from the shipped deck.
    pub const DECK_CARDS: [&str; 5] = ["knight", "archer", "giant", "fireball", "minions"];

    /// Real-time frame delta in milliseconds, from a fast to a stuttering
    /// frame.
    pub fn arb_frame_ms() -> impl Strategy<Value = u64> {
        1u64..250
    }

    /// One of the shipped deck cards.
    pub fn arb_card_id() -> impl Strategy<Value = String> {
        (0..DECK_CARDS.len()).prop_map(|i| DECK_CARDS[i].to_string())
    }

    /// A deploy command anywhere in or slightly outside the arena.
    pub fn arb_deploy(side: Side) -> impl Strategy<Value = DeployCommand> {
        (arb_card_id(), -20i32..400, -20i32..500)
            .prop_map(move |(card, x, y)| DeployCommand::new(card, x, y, side))
    }

    /// A per-frame script: for each frame an optional home deploy.
    pub fn arb_script(frames: usize) -> impl Strategy<Value = Vec<(u64, Option<DeployCommand>)>> {
        prop::collection::vec(
            (arb_frame_ms(), prop::option::of(arb_deploy(Side::Home))),
            1..=frames,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::started_match;

    #[test]
    fn test_same_seed_matches_agree() {
        assert!(verify_match_determinism(|| started_match(42), 300, 16));
        assert_eq!(find_first_divergence(|| started_match(42), 300, 16), None);
    }

    #[test]
    fn test_parallel_matches_agree() {
        run_parallel_matches(|| started_match(3), 4, 200, 33).assert_deterministic();
    }

    #[test]
    fn test_different_seeds_diverge_once_ai_acts() {
        // Both AI opponents act at 3000 ms; different seeds pick differently.
        let result = verify_determinism(
            1,
            400,
            || (started_match(1), started_match(2)),
            |(a, b), _| {
                a.tick(16);
                b.tick(16);
            },
            |(a, b)| u64::from(a.state_hash() == b.state_hash()),
        );
        assert_eq!(result.hashes, vec![0]);
    }
}
