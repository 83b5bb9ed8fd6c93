//! Run a whole match without input, streaming JSON lines.
//!
//! The match is ticked with a fixed real-time frame. The home side is
//! either idle or played by the [`Autopilot`]; the away side is always the
//! computer opponent.

use std::io::{self, Write};

use arena_core::config::Settings;
use arena_core::data::CardCatalog;
use arena_core::error::GameError;
use arena_core::simulation::{Match, MatchResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autopilot::Autopilot;
use crate::protocol::Response;

/// Offset mixed into the seed for the autopilot's own generator.
const AUTOPILOT_SEED_SALT: u64 = 0x5eed_a070;

/// Configuration for a single unattended match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Match seed.
    pub seed: u64,
    /// Real milliseconds per frame.
    pub frame_ms: u64,
    /// Give up and stop the match after this many ticks.
    pub max_ticks: u64,
    /// Emit a snapshot every N ticks (0 = only the final one).
    pub snapshot_every: u64,
    /// Autopilot action interval for the home side, if enabled.
    pub autopilot_ms: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frame_ms: 16,
            // Three minutes at 16 ms plus slack.
            max_ticks: 12_000,
            snapshot_every: 0,
            autopilot_ms: Some(3_000),
        }
    }
}

/// Summary of an unattended match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    /// Match seed.
    pub seed: u64,
    /// Ticks processed.
    pub ticks: u64,
    /// Final result.
    pub result: MatchResult,
    /// State hash after the last tick.
    pub final_hash: u64,
    /// Accepted home deploys.
    pub home_deploys: u32,
    /// Accepted away deploys.
    pub away_deploys: u32,
    /// Home deploys refused by the match.
    pub rejected_deploys: u32,
}

/// Errors from an unattended run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The match could not be set up.
    #[error("Match setup failed: {0}")]
    Setup(#[from] GameError),

    /// Writing output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Play one match to completion.
///
/// # Errors
///
/// Returns [`RunError`] if the match cannot start or output cannot be
/// written.
pub fn run_game(
    catalog: CardCatalog,
    settings: Settings,
    config: &GameConfig,
    out: &mut impl Write,
) -> Result<GameReport, RunError> {
    let mut game = Match::new(catalog, settings, config.seed)?;
    game.start()?;
    let mut pilot = config
        .autopilot_ms
        .map(|interval| Autopilot::new(interval, config.seed ^ AUTOPILOT_SEED_SALT));

    tracing::info!(
        seed = config.seed,
        frame_ms = config.frame_ms,
        autopilot = pilot.is_some(),
        "Running match"
    );

    let mut home_deploys = 0;
    let mut away_deploys = 0;
    let mut rejected_deploys = 0;
    let mut result = None;

    while result.is_none() && game.tick_count() < config.max_ticks {
        if let Some(command) = pilot.as_mut().and_then(|p| p.poll(&game)) {
            let card_id = command.card_id.clone();
            match game.deploy(command) {
                Ok(deployed) => {
                    home_deploys += 1;
                    write_line(
                        out,
                        &Response::Deployed {
                            card_id,
                            units: deployed.spawned,
                        },
                    )?;
                }
                Err(err) => {
                    rejected_deploys += 1;
                    tracing::debug!(%err, "Autopilot deploy rejected");
                    write_line(
                        out,
                        &Response::Rejected {
                            card_id,
                            reason: err.to_string(),
                        },
                    )?;
                }
            }
        }

        let events = game.tick(config.frame_ms);
        if events.ai_deploy.is_some() {
            away_deploys += 1;
        }
        result = events.result;

        if config.snapshot_every > 0 && game.tick_count() % config.snapshot_every == 0 {
            write_state(out, &game)?;
        }
    }

    let result = match result {
        Some(result) => result,
        None => {
            tracing::warn!(ticks = game.tick_count(), "Tick limit reached, stopping match");
            game.end().ok_or_else(|| {
                GameError::InvalidState("match left the playing phase without a result".into())
            })?
        }
    };

    write_state(out, &game)?;
    write_line(out, &Response::MatchOver { result })?;
    out.flush()?;

    Ok(GameReport {
        seed: config.seed,
        ticks: game.tick_count(),
        result,
        final_hash: game.state_hash(),
        home_deploys,
        away_deploys,
        rejected_deploys,
    })
}

/// Run the same configuration `runs` times and collect the final hashes.
///
/// # Errors
///
/// Returns the first [`RunError`] encountered.
pub fn verify_seed(
    catalog: &CardCatalog,
    settings: &Settings,
    config: &GameConfig,
    runs: u32,
) -> Result<Vec<u64>, RunError> {
    (0..runs)
        .map(|_| {
            run_game(catalog.clone(), settings.clone(), config, &mut io::sink())
                .map(|report| report.final_hash)
        })
        .collect()
}

fn write_state(out: &mut impl Write, game: &Match) -> io::Result<()> {
    write_line(
        out,
        &Response::State {
            hash: game.state_hash(),
            snapshot: game.snapshot(),
        },
    )
}

fn write_line(out: &mut impl Write, response: &Response) -> io::Result<()> {
    out.write_all(response.to_json_line().as_bytes())
}
