//! The static card/tower table.
//!
//! Parsed once at startup from a RON document and validated as a whole.
//! A malformed table is a configuration error; nothing falls back to a
//! default silently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::arena_data::{ArenaLayout, MatchRules};
use super::card_data::{Card, TowerTable};
use crate::error::{GameError, Result};

/// Number of cards in a deck: four in hand plus the next card.
pub const DECK_SIZE: usize = 5;

/// The card table shipped with the game.
pub const BUILTIN_CATALOG: &str = include_str!("../../../../assets/data/cards.ron");

/// Raw document layout, before validation.
///
/// # Example RON
///
/// ```ron
/// CatalogDocument(
///     cards: [Troop((id: "knight", ...)), Spell((id: "fireball", ...))],
///     towers: (king: (...), flank: (...)),
///     deck: ["knight", "archer", "giant", "fireball", "minions"],
///     ai_pool: ["knight", "archer", "giant", "fireball", "minions"],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Every card definition.
    pub cards: Vec<Card>,
    /// Tower stats.
    pub towers: TowerTable,
    /// The player's card pool, in initial hand order.
    pub deck: Vec<String>,
    /// Cards the computer opponent chooses from.
    pub ai_pool: Vec<String>,
    /// Match constants.
    #[serde(default)]
    pub rules: MatchRules,
    /// Arena geometry.
    #[serde(default)]
    pub layout: ArenaLayout,
}

impl CatalogDocument {
    /// Find a card by its ID.
    #[must_use]
    pub fn get_card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    /// Validate internal consistency.
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for card in &self.cards {
            card.validate_into(&mut errors);
            if !seen.insert(card.id()) {
                errors.push(format!("Duplicate card id '{}'", card.id()));
            }
        }

        self.towers.king.validate_into("king", &mut errors);
        self.towers.flank.validate_into("flank", &mut errors);

        if self.deck.len() != DECK_SIZE {
            errors.push(format!(
                "Deck has {} cards, expected {DECK_SIZE}",
                self.deck.len()
            ));
        }
        let distinct: HashSet<&str> = self.deck.iter().map(String::as_str).collect();
        if distinct.len() != self.deck.len() {
            errors.push("Deck contains duplicate cards".to_string());
        }
        for id in &self.deck {
            if self.get_card(id).is_none() {
                errors.push(format!("Deck references unknown card '{id}'"));
            }
        }

        if self.ai_pool.is_empty() {
            errors.push("AI card pool is empty".to_string());
        }
        for id in &self.ai_pool {
            if self.get_card(id).is_none() {
                errors.push(format!("AI pool references unknown card '{id}'"));
            }
        }

        self.rules.validate_into(&mut errors);
        self.layout.validate_into(&mut errors);

        errors
    }
}

/// Validated, read-only card catalog.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    document: CatalogDocument,
}

impl CardCatalog {
    /// Validate a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ValidationError`] listing every problem found.
    pub fn from_document(source_name: &str, document: CatalogDocument) -> Result<Self> {
        let errors = document.validate();
        if !errors.is_empty() {
            return Err(GameError::ValidationError {
                source_name: source_name.to_string(),
                errors,
            });
        }

        tracing::info!(
            "Loaded catalog '{}' with {} cards",
            source_name,
            document.cards.len()
        );

        Ok(Self { document })
    }

    /// Parse and validate a RON document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] on malformed RON, or
    /// [`GameError::ValidationError`] on inconsistent data.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let document: CatalogDocument =
            ron::from_str(text).map_err(|e| GameError::DataParseError {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        Self::from_document(source_name, document)
    }

    /// The catalog shipped with the game.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded document is broken.
    pub fn builtin() -> Result<Self> {
        Self::from_ron_str("builtin", BUILTIN_CATALOG)
    }

    /// Find a card by its ID.
    #[must_use]
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.document.get_card(id)
    }

    /// All cards.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.document.cards
    }

    /// Tower stats.
    #[must_use]
    pub fn towers(&self) -> &TowerTable {
        &self.document.towers
    }

    /// The player's card pool.
    #[must_use]
    pub fn deck(&self) -> &[String] {
        &self.document.deck
    }

    /// Cards available to the computer opponent.
    #[must_use]
    pub fn ai_pool(&self) -> &[String] {
        &self.document.ai_pool
    }

    /// Match constants.
    #[must_use]
    pub fn rules(&self) -> &MatchRules {
        &self.document.rules
    }

    /// Arena geometry.
    #[must_use]
    pub fn layout(&self) -> &ArenaLayout {
        &self.document.layout
    }
}
