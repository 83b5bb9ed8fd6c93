//! Error types for the battle simulation.

use thiserror::Error;

use crate::components::Side;
use crate::math::Fixed;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for configuration and state errors.
///
/// These are startup or programming faults. Gameplay rejections use
/// [`DeployError`] instead and never leave the simulation half-mutated.
#[derive(Debug, Error)]
pub enum GameError {
    /// Data document parsing error.
    #[error("Failed to parse data document '{source_name}': {message}")]
    DataParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Data document parsed but is internally inconsistent.
    #[error("Validation failed for '{source_name}': {errors:?}")]
    ValidationError {
        /// Name of the document that failed validation.
        source_name: String,
        /// Every problem found.
        errors: Vec<String>,
    },

    /// Card identifier absent from the catalog.
    #[error("Unknown card: {0}")]
    UnknownCard(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Why a deploy command was rejected.
///
/// A rejected deploy leaves elixir, hand and battlefield untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// Deploys are only accepted while a match is playing.
    #[error("No match is in progress")]
    MatchNotRunning,

    /// Card identifier absent from the catalog.
    #[error("Unknown card '{0}'")]
    UnknownCard(String),

    /// Card exists but is not currently in the player's hand.
    #[error("Card '{0}' is not in hand")]
    NotInHand(String),

    /// Not enough elixir to pay for the card.
    #[error("Insufficient elixir for {side:?}: need {required}, have {available}")]
    InsufficientElixir {
        /// Side that attempted the deploy.
        side: Side,
        /// Card cost.
        required: u32,
        /// Whole elixir units available.
        available: u32,
    },

    /// Position lies outside the side's legal deployment region.
    #[error("Position ({x}, {y}) is outside the deployment region for {side:?}")]
    OutOfBounds {
        /// Side that attempted the deploy.
        side: Side,
        /// Requested x coordinate.
        x: Fixed,
        /// Requested y coordinate.
        y: Fixed,
    },
}
