//! Replay determinism.
//!
//! Same seed, same frame timings and same commands must give the same state
//! after every tick, on any thread.

use arena_core::components::Side;
use arena_core::simulation::DeployCommand;
use arena_test_utils::determinism::strategies::arb_script;
use arena_test_utils::determinism::{
    find_first_divergence, run_parallel_matches, verify_determinism,
};
use arena_test_utils::fixtures::started_match;
use proptest::prelude::*;

fn scripted(seed: u64) -> arena_core::simulation::Match {
    let mut game = started_match(seed);
    game.enqueue(DeployCommand::new("giant", 305, 260, Side::Home));
    game.enqueue(DeployCommand::new("knight", 70, 300, Side::Home));
    game
}

#[test]
fn test_full_match_replays_identically() {
    let result = verify_determinism(
        3,
        12_000,
        || scripted(99),
        |game, tick| {
            if tick % 400 == 0 {
                game.enqueue(DeployCommand::new("archer", 187, 300, Side::Home));
            }
            game.tick(16);
        },
        |game| game.state_hash(),
    );
    result.assert_deterministic();
}

#[test]
fn test_no_divergence_tick_by_tick() {
    assert_eq!(find_first_divergence(|| scripted(5), 2_000, 16), None);
}

#[test]
fn test_threads_agree() {
    run_parallel_matches(|| scripted(17), 4, 3_000, 33).assert_deterministic();
}

#[test]
fn test_result_is_reproducible() {
    let play = || {
        let mut game = scripted(1234);
        while game.result().is_none() {
            game.tick(50);
        }
        game.result()
    };
    assert_eq!(play(), play());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any script replays to the same hash.
    #[test]
    fn test_scripts_replay(script in arb_script(100), seed in any::<u64>()) {
        let run = || {
            let mut game = started_match(seed);
            for (frame_ms, command) in &script {
                if let Some(command) = command {
                    game.enqueue(command.clone());
                }
                game.tick(*frame_ms);
            }
            game.state_hash()
        };
        prop_assert_eq!(run(), run());
    }
}
