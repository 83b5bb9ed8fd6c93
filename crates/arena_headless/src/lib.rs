//! Headless match runner for scripted play and CI verification.
//!
//! This crate drives [`arena_core`] matches without graphics. It enables:
//!
//! - **Scripted play**: an external controller plays the home side through
//!   JSON commands on stdin, with render snapshots on stdout
//! - **Unattended matches**: the autopilot plays the home side against the
//!   computer opponent for a full match
//! - **Determinism checks**: the same seed replayed several times must give
//!   the same final state hash
//! - **Data validation**: card tables and settings files are checked before
//!   they ship
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: commands from the controller (start, deploy, tick, ...)
//! - **stdout**: responses and snapshots (JSON)
//! - **stderr**: logs (human-readable)
//!
//! See the [`protocol`] module for the command and response formats.
//!
//! # Example
//!
//! ```bash
//! # Interactive session
//! echo '{"cmd":"start"}' | cargo run -p arena_headless -- play
//!
//! # One unattended match with snapshots every second of game time
//! cargo run -p arena_headless -- run --seed 7 --snapshot-every 60
//!
//! # Check data files
//! cargo run -p arena_headless -- validate --catalog assets/data/cards.ron
//! ```

pub mod autopilot;
pub mod game_runner;
pub mod loader;
pub mod protocol;
pub mod runner;

pub use autopilot::Autopilot;
pub use game_runner::{run_game, verify_seed, GameConfig, GameReport, RunError};
pub use loader::{load_catalog, load_settings, DataLoadError};
pub use protocol::{Command, Response};
pub use runner::HeadlessRunner;
