//! Scripted stand-in for the human player.
//!
//! Plays the home side with the same rules as the computer opponent, but
//! only from the current hand, so deck rotation is exercised.

use arena_core::ai::choose;
use arena_core::rng::{seeded, DefaultRng, RandomSource};
use arena_core::simulation::{DeployCommand, Match, PLAYER_SIDE};

/// Timer-gated home player.
#[derive(Debug, Clone)]
pub struct Autopilot {
    interval_ms: u64,
    last_action_ms: u64,
    rng: DefaultRng,
}

impl Autopilot {
    /// Create an autopilot acting every `interval_ms` of match time.
    ///
    /// Uses its own generator so that toggling it does not shift the
    /// opponent's random choices.
    pub fn new(interval_ms: u64, seed: u64) -> Self {
        Self {
            interval_ms,
            last_action_ms: 0,
            rng: seeded(seed),
        }
    }

    /// Decide on a deploy for the current state, if the interval elapsed.
    pub fn poll<R: RandomSource>(&mut self, game: &Match<R>) -> Option<DeployCommand> {
        let now = game.elapsed_ms();
        if now < self.last_action_ms {
            // New match started since the last poll.
            self.last_action_ms = 0;
        }
        if now - self.last_action_ms < self.interval_ms {
            return None;
        }
        self.last_action_ms = now;

        let decision = choose(
            PLAYER_SIDE,
            game.deck().hand(),
            game.catalog(),
            game.economy(),
            game.battlefield(),
            &mut self.rng,
        )?;
        tracing::trace!(card = %decision.card_id, now, "Autopilot deploy");
        Some(DeployCommand {
            card_id: decision.card_id,
            position: decision.position,
            side: PLAYER_SIDE,
        })
    }
}
