//! Test fixtures and helpers.
//!
//! Pre-built matches, unit spawns and a scripted random source for
//! consistent testing.

use arena_core::battlefield::{Battlefield, UnitSpawn};
use arena_core::components::{EntityId, Side, UnitStats};
use arena_core::config::Settings;
use arena_core::data::{Card, CardCatalog};
use arena_core::math::Vec2Fixed;
use arena_core::rng::RandomSource;
use arena_core::simulation::Match;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a position from integer coordinates.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// The shipped card catalog.
///
/// # Panics
///
/// Panics if the embedded catalog fails to load.
#[must_use]
pub fn builtin_catalog() -> CardCatalog {
    CardCatalog::builtin().expect("builtin catalog must load")
}

/// A match on the shipped catalog with default settings, already started.
///
/// # Panics
///
/// Panics if the match cannot be created.
#[must_use]
pub fn started_match(seed: u64) -> Match {
    started_match_with(Settings::default(), seed)
}

/// A started match with custom settings.
///
/// # Panics
///
/// Panics if the match cannot be created.
#[must_use]
pub fn started_match_with(settings: Settings, seed: u64) -> Match {
    let mut game = Match::new(builtin_catalog(), settings, seed).expect("match must build");
    game.start().expect("match must start");
    game
}

/// A started match driven by a scripted random source.
///
/// # Panics
///
/// Panics if the match cannot be created.
#[must_use]
pub fn scripted_match(rng: SequenceRng) -> Match<SequenceRng> {
    let mut game =
        Match::with_rng(builtin_catalog(), Settings::default(), rng).expect("match must build");
    game.start().expect("match must start");
    game
}

/// A battlefield with the six starting towers.
#[must_use]
pub fn battlefield_with_towers() -> Battlefield {
    let catalog = builtin_catalog();
    Battlefield::with_towers(catalog.layout(), catalog.towers(), catalog.rules())
}

/// Spawn one unit of a catalog card directly onto a battlefield, active
/// immediately.
///
/// # Panics
///
/// Panics if the card is unknown or a spell.
pub fn spawn_card(field: &mut Battlefield, card_id: &str, side: Side, at: Vec2Fixed) -> EntityId {
    let catalog = builtin_catalog();
    let card = catalog.card(card_id).expect("card must exist");
    let is_building = matches!(card, Card::Building(_));
    let unit = card.unit().expect("card must spawn units");
    field.spawn_unit(UnitSpawn {
        card_id: unit.id.clone(),
        side,
        position: at,
        health: unit.health,
        stats: UnitStats::from_card(unit, is_building, catalog.rules()),
        active_at_ms: 0,
    })
}

/// Random source that replays fixed sequences.
///
/// Indices are reduced modulo the requested length. Both sequences cycle;
/// an empty sequence always yields zero.
#[derive(Debug, Clone, Default)]
pub struct SequenceRng {
    indices: Vec<usize>,
    fractions: Vec<I32F32>,
    next_index: usize,
    next_fraction: usize,
}

impl SequenceRng {
    /// Create a source from index and fraction scripts.
    #[must_use]
    pub fn new(indices: Vec<usize>, fractions: Vec<I32F32>) -> Self {
        Self {
            indices,
            fractions,
            next_index: 0,
            next_fraction: 0,
        }
    }

    /// A source that always picks the first option and the lowest point.
    #[must_use]
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Number of index picks made so far.
    #[must_use]
    pub const fn picks(&self) -> usize {
        self.next_index
    }
}

impl RandomSource for SequenceRng {
    fn pick_index(&mut self, len: usize) -> usize {
        let value = if self.indices.is_empty() {
            0
        } else {
            self.indices[self.next_index % self.indices.len()]
        };
        self.next_index += 1;
        value % len.max(1)
    }

    fn unit_fraction(&mut self) -> I32F32 {
        let value = if self.fractions.is_empty() {
            I32F32::ZERO
        } else {
            self.fractions[self.next_fraction % self.fractions.len()]
        };
        self.next_fraction += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rng_cycles() {
        let mut rng = SequenceRng::new(vec![1, 4], vec![fixed_f(0.25)]);
        assert_eq!(rng.pick_index(3), 1);
        assert_eq!(rng.pick_index(3), 1);
        assert_eq!(rng.pick_index(10), 1);
        assert_eq!(rng.unit_fraction(), fixed_f(0.25));
        assert_eq!(rng.unit_fraction(), fixed_f(0.25));
        assert_eq!(rng.picks(), 3);
    }

    #[test]
    fn test_started_match_is_playing() {
        let game = started_match(1);
        assert_eq!(
            game.phase(),
            arena_core::simulation::MatchPhase::Playing
        );
    }
}
