//! Hand rotation for the player's card pool.
//!
//! The pool holds exactly five cards: four in hand and one queued as the
//! next card. Playing a card sends the queued card to the back of the hand
//! and draws a new next card from whatever the hand no longer holds.

use serde::{Deserialize, Serialize};

use crate::data::DECK_SIZE;
use crate::error::{GameError, Result};
use crate::rng::RandomSource;

/// Number of playable cards.
pub const HAND_SIZE: usize = DECK_SIZE - 1;

/// The player's hand and next card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckManager {
    pool: Vec<String>,
    hand: Vec<String>,
    next: String,
}

impl DeckManager {
    /// Build the opening hand from a pool: the first four cards form the
    /// hand in order and the fifth is the next card.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the pool is not exactly five
    /// distinct cards.
    pub fn new(pool: &[String]) -> Result<Self> {
        if pool.len() != DECK_SIZE {
            return Err(GameError::InvalidState(format!(
                "deck needs {DECK_SIZE} cards, got {}",
                pool.len()
            )));
        }
        for (i, card) in pool.iter().enumerate() {
            if pool[..i].contains(card) {
                return Err(GameError::InvalidState(format!(
                    "deck lists '{card}' twice"
                )));
            }
        }

        Ok(Self {
            pool: pool.to_vec(),
            hand: pool[..HAND_SIZE].to_vec(),
            next: pool[HAND_SIZE].clone(),
        })
    }

    /// Cards currently playable, in order.
    #[must_use]
    pub fn hand(&self) -> &[String] {
        &self.hand
    }

    /// The card that enters the hand on the next play.
    #[must_use]
    pub fn next_card(&self) -> &str {
        &self.next
    }

    /// Check if a card is playable.
    #[must_use]
    pub fn in_hand(&self, card_id: &str) -> bool {
        self.hand.iter().any(|c| c == card_id)
    }

    /// Rotate `card_id` out of the hand.
    ///
    /// Returns false and changes nothing if the card is not in hand.
    pub fn play(&mut self, card_id: &str, rng: &mut impl RandomSource) -> bool {
        let Some(slot) = self.hand.iter().position(|c| c == card_id) else {
            return false;
        };

        self.hand.remove(slot);
        self.hand.push(self.next.clone());

        let absent: Vec<&String> = self
            .pool
            .iter()
            .filter(|card| !self.hand.contains(card))
            .collect();
        debug_assert_eq!(absent.len(), DECK_SIZE - HAND_SIZE);
        if !absent.is_empty() {
            self.next = absent[rng.pick_index(absent.len())].clone();
        }

        debug_assert_eq!(self.hand.len(), HAND_SIZE);
        true
    }
}
