//! # Arena Core
//!
//! Deterministic battle simulation for Crown Arena.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every random choice goes through an injected
//!   [`rng::RandomSource`])
//! - No floating-point math inside a tick (uses fixed-point)
//!
//! This separation enables:
//! - Headless runs and batch simulation
//! - Scripted, replayable tests
//! - Determinism checks via [`simulation::Match::state_hash`]
//!
//! ## Crate Structure
//!
//! - [`data`] - Card, tower and arena definitions loaded from RON
//! - [`components`] - Units, towers, spells and projectiles
//! - [`battlefield`] - Registry owning everything on the field
//! - [`targeting`] - Target selection
//! - [`systems`] - Per-tick unit, tower, projectile and spell updates
//! - [`economy`] - Elixir pools
//! - [`deck`] - Hand rotation
//! - [`ai`] - Computer opponent
//! - [`victory`] - Crowns and match termination
//! - [`simulation`] - The match loop
//! - [`snapshot`] - Render snapshot
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod battlefield;
pub mod components;
pub mod config;
pub mod data;
pub mod deck;
pub mod economy;
pub mod error;
pub mod math;
pub mod rng;
pub mod simulation;
pub mod snapshot;
pub mod systems;
pub mod targeting;
pub mod victory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battlefield::Battlefield;
    pub use crate::components::*;
    pub use crate::config::{Difficulty, Settings};
    pub use crate::data::{Card, CardCatalog, TargetingClass, TowerKind};
    pub use crate::deck::DeckManager;
    pub use crate::economy::EconomyTracker;
    pub use crate::error::{DeployError, GameError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::rng::{DefaultRng, RandomSource};
    pub use crate::simulation::{
        DeployCommand, Deployed, Match, MatchPhase, MatchResult, TickEvents,
    };
    pub use crate::snapshot::RenderSnapshot;
    pub use crate::victory::{Crowns, EndReason, Outcome};
}
