//! Data structures for the static card table.
//!
//! All structs are designed to be deserialized from RON documents.
//!
//! **Note:** This module does no file IO. Reading documents from disk is
//! handled by `arena_headless`.

mod arena_data;
mod card_data;
mod catalog;

pub use arena_data::{ArenaLayout, MatchRules, TowerSlot};
pub use card_data::{Card, SpellCard, TargetingClass, TowerData, TowerKind, TowerTable, UnitCard};
pub use catalog::{CardCatalog, CatalogDocument, BUILTIN_CATALOG, DECK_SIZE};
