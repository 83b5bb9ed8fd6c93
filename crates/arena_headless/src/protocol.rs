//! JSON-lines protocol for driving a match without a frontend.
//!
//! **Input (stdin):** one [`Command`] per line, tagged by `cmd`.
//! **Output (stdout):** one [`Response`] per line, tagged by `type`.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","phase":"Menu"}
//! -> {"cmd":"start"}
//! <- {"type":"ack","cmd":"start"}
//! -> {"cmd":"deploy","card_id":"knight","x":120,"y":380}
//! <- {"type":"deployed","card_id":"knight","units":[7]}
//! -> {"cmd":"tick","count":60,"frame_ms":16}
//! <- {"type":"state","hash":...,"snapshot":{"tick":60,...}}
//! ```

use arena_core::config::Difficulty;
use arena_core::simulation::MatchResult;
use arena_core::snapshot::RenderSnapshot;
use serde::{Deserialize, Serialize};

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Commands accepted by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Begin a match from the menu or result screen.
    Start,

    /// Advance `count` frames of `frame_ms` real milliseconds each.
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
        #[serde(default = "default_frame_ms")]
        frame_ms: u64,
    },

    /// Play a card from the player's hand.
    Deploy { card_id: String, x: f64, y: f64 },

    /// Report the current snapshot without advancing time.
    Query,

    /// Report the state hash.
    Hash,

    /// Change difficulty and/or game speed.
    Settings {
        #[serde(default)]
        difficulty: Option<Difficulty>,
        #[serde(default)]
        game_speed: Option<f64>,
    },

    /// Stop the running match.
    End,

    /// Return from the result screen to the menu.
    Menu,

    /// Close the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

fn default_frame_ms() -> u64 {
    16
}

/// Lines written by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Session is ready for commands.
    Ready { version: String, phase: String },

    /// Command applied.
    Ack { cmd: String },

    /// Command could not be parsed or applied.
    Error { message: String, cmd: Option<String> },

    /// Current render snapshot.
    State { hash: u64, snapshot: RenderSnapshot },

    /// A deploy was accepted.
    Deployed { card_id: String, units: Vec<u64> },

    /// A deploy was refused; nothing changed.
    Rejected { card_id: String, reason: String },

    /// The match finished.
    MatchOver { result: MatchResult },

    /// State hash for determinism checks.
    StateHash { tick: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

impl Response {
    /// Create a ready response.
    pub fn ready(phase: impl Into<String>) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            phase: phase.into(),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to a JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}","cmd":null}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Command name for acknowledgments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Tick { .. } => "tick",
            Self::Deploy { .. } => "deploy",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Settings { .. } => "settings",
            Self::End => "end",
            Self::Menu => "menu",
            Self::Quit => "quit",
        }
    }
}
