//! Interactive session: JSON commands in, JSON responses out.
//!
//! Stands in for the frontend. Every command is applied at a tick boundary;
//! `tick` advances the match and reports the resulting snapshot.

use std::io::{self, BufRead, Write};

use arena_core::config::Settings;
use arena_core::data::CardCatalog;
use arena_core::error::Result as GameResult;
use arena_core::math::{Fixed, Vec2Fixed};
use arena_core::simulation::{DeployCommand, Match, MatchPhase, PLAYER_SIDE};

use crate::protocol::{Command, Response};

/// Whether the session should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Headless session around one [`Match`].
#[derive(Debug)]
pub struct HeadlessRunner {
    game: Match,
    /// Emit a snapshot after every tick command.
    auto_state: bool,
}

impl HeadlessRunner {
    /// Create a session. The match waits in the menu until `start`.
    ///
    /// # Errors
    ///
    /// Fails if the settings or catalog are unusable.
    pub fn new(catalog: CardCatalog, settings: Settings, seed: u64) -> GameResult<Self> {
        Ok(Self {
            game: Match::new(catalog, settings, seed)?,
            auto_state: true,
        })
    }

    /// Only report state on `query`.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.auto_state = false;
        self
    }

    /// The match being driven.
    #[must_use]
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Serve commands until `quit` or end of input.
    ///
    /// Malformed lines produce an error response and are otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an IO error if reading or writing fails.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        emit(output, &Response::ready(phase_name(self.game.phase())))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let flow = match Command::from_json(line) {
                Ok(command) => self.handle(command, output)?,
                Err(e) => {
                    emit(output, &Response::error(format!("Parse error: {e}"), None))?;
                    Flow::Continue
                }
            };
            output.flush()?;
            if flow == Flow::Quit {
                break;
            }
        }

        tracing::info!(ticks = self.game.tick_count(), "Session closed");
        Ok(())
    }

    fn handle(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        let name = command.name();
        tracing::debug!(cmd = name, "Command");

        match command {
            Command::Start => match self.game.start() {
                Ok(()) => emit(out, &Response::ack(name))?,
                Err(e) => emit(out, &Response::error(e.to_string(), Some(name)))?,
            },

            Command::Tick { count, frame_ms } => {
                if self.game.phase() != MatchPhase::Playing {
                    emit(out, &Response::error("No match is in progress", Some(name)))?;
                    return Ok(Flow::Continue);
                }
                for _ in 0..count {
                    let events = self.game.tick(frame_ms);
                    if let Some(deployed) = events.ai_deploy {
                        tracing::debug!(card = %deployed.card_id, "Opponent deployed");
                    }
                    if let Some(result) = events.result {
                        emit(out, &Response::MatchOver { result })?;
                        break;
                    }
                }
                if self.auto_state {
                    self.emit_state(out)?;
                }
            }

            Command::Deploy { card_id, x, y } => {
                let Some(position) = to_position(x, y) else {
                    emit(out, &Response::error(format!("Bad position ({x}, {y})"), Some(name)))?;
                    return Ok(Flow::Continue);
                };
                let command = DeployCommand {
                    card_id: card_id.clone(),
                    position,
                    side: PLAYER_SIDE,
                };
                match self.game.deploy(command) {
                    Ok(deployed) => emit(
                        out,
                        &Response::Deployed {
                            card_id,
                            units: deployed.spawned,
                        },
                    )?,
                    Err(err) => emit(
                        out,
                        &Response::Rejected {
                            card_id,
                            reason: err.to_string(),
                        },
                    )?,
                }
            }

            Command::Query => self.emit_state(out)?,

            Command::Hash => emit(
                out,
                &Response::StateHash {
                    tick: self.game.tick_count(),
                    hash: self.game.state_hash(),
                },
            )?,

            Command::Settings {
                difficulty,
                game_speed,
            } => {
                let mut settings = self.game.settings().clone();
                if let Some(difficulty) = difficulty {
                    settings.difficulty = difficulty;
                }
                let speed = game_speed
                    .map(|s| s.is_finite().then(|| Fixed::checked_from_num(s)).flatten());
                match speed {
                    Some(None) => {
                        emit(out, &Response::error("Game speed out of range", Some(name)))?;
                        return Ok(Flow::Continue);
                    }
                    Some(Some(speed)) => settings.game_speed = speed,
                    None => {}
                }
                match self.game.apply_settings(settings) {
                    Ok(()) => emit(out, &Response::ack(name))?,
                    Err(e) => emit(out, &Response::error(e.to_string(), Some(name)))?,
                }
            }

            Command::End => match self.game.end() {
                Some(result) => emit(out, &Response::MatchOver { result })?,
                None => emit(out, &Response::error("No match to end", Some(name)))?,
            },

            Command::Menu => match self.game.return_to_menu() {
                Ok(()) => emit(out, &Response::ack(name))?,
                Err(e) => emit(out, &Response::error(e.to_string(), Some(name)))?,
            },

            Command::Quit => {
                emit(out, &Response::Bye)?;
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    fn emit_state(&self, out: &mut impl Write) -> io::Result<()> {
        emit(
            out,
            &Response::State {
                hash: self.game.state_hash(),
                snapshot: self.game.snapshot(),
            },
        )
    }
}

fn emit(out: &mut impl Write, response: &Response) -> io::Result<()> {
    out.write_all(response.to_json_line().as_bytes())
}

fn to_position(x: f64, y: f64) -> Option<Vec2Fixed> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Vec2Fixed::new(
        Fixed::checked_from_num(x)?,
        Fixed::checked_from_num(y)?,
    ))
}

fn phase_name(phase: MatchPhase) -> &'static str {
    match phase {
        MatchPhase::Menu => "Menu",
        MatchPhase::Playing => "Playing",
        MatchPhase::Over => "Over",
    }
}
