//! Player-facing settings that affect the simulation.
//!
//! Only difficulty and game speed reach the core. The remaining fields are
//! carried for the UI collaborator so one settings document serves both.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};

/// Opponent difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slow opponent.
    Easy,
    /// Default pace.
    #[default]
    Normal,
    /// Fast opponent.
    Hard,
}

impl Difficulty {
    /// Milliseconds of match time between AI actions.
    #[must_use]
    pub const fn action_interval_ms(self) -> u64 {
        match self {
            Self::Easy => 4_000,
            Self::Normal => 3_000,
            Self::Hard => 2_000,
        }
    }
}

/// Settings record.
///
/// # Example RON
///
/// ```ron
/// Settings(
///     difficulty: Hard,
///     game_speed: 1.5,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Opponent difficulty.
    pub difficulty: Difficulty,
    /// Multiplier applied to real time before it reaches the match clock.
    #[serde(with = "fixed_serde")]
    pub game_speed: Fixed,
    /// Display name.
    pub username: String,
    /// Sound effects toggle.
    pub sound: bool,
    /// Music toggle.
    pub music: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            game_speed: Fixed::ONE,
            username: "Player".to_string(),
            sound: true,
            music: true,
        }
    }
}

impl Settings {
    /// Slowest allowed game speed.
    pub const MIN_GAME_SPEED: Fixed = Fixed::from_bits(1 << 31);
    /// Fastest allowed game speed.
    pub const MAX_GAME_SPEED: Fixed = Fixed::from_bits(2 << 32);

    /// Validate the record.
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.game_speed < Self::MIN_GAME_SPEED || self.game_speed > Self::MAX_GAME_SPEED {
            errors.push(format!(
                "Game speed {} outside {}..={}",
                self.game_speed,
                Self::MIN_GAME_SPEED,
                Self::MAX_GAME_SPEED
            ));
        }
        errors
    }

    /// Parse and validate a RON document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] on malformed RON, or
    /// [`GameError::ValidationError`] on out-of-range values.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let settings: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        let errors = settings.validate();
        if !errors.is_empty() {
            return Err(GameError::ValidationError {
                source_name: source_name.to_string(),
                errors,
            });
        }
        Ok(settings)
    }

    /// AI action interval for the configured difficulty.
    #[must_use]
    pub const fn action_interval_ms(&self) -> u64 {
        self.difficulty.action_interval_ms()
    }
}
