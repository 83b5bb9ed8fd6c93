//! Card and tower definitions.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Restriction on what a unit may select as a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingClass {
    /// Ground units and buildings only; airborne units are ignored.
    Ground,
    /// Anything on the opposing side.
    AirAndGround,
    /// Building entities and towers only.
    Buildings,
}

/// Stats shared by every card that puts units on the field.
///
/// # Example RON
///
/// ```ron
/// Troop((
///     id: "archer",
///     name: "Archers",
///     cost: 3,
///     health: 254,
///     damage: 89,
///     hit_speed_ms: 1200,
///     range: 5.5,
///     move_speed: 60.0,
///     targets: AirAndGround,
///     unit_count: 2,
///     deploy_delay_ms: 1000,
/// ))
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCard {
    /// Unique string identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Elixir cost.
    pub cost: u32,

    /// Maximum health of each spawned unit.
    pub health: u32,

    /// Damage per hit.
    pub damage: u32,

    /// Milliseconds between hits.
    pub hit_speed_ms: u64,

    /// Attack range in tiles.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,

    /// Movement speed in distance units per second. Zero for buildings.
    #[serde(with = "fixed_serde", default = "zero")]
    pub move_speed: Fixed,

    /// What this unit is allowed to target.
    pub targets: TargetingClass,

    /// Number of units spawned per deploy.
    #[serde(default = "default_unit_count")]
    pub unit_count: u32,

    /// Milliseconds after deploy before the unit starts acting.
    #[serde(default)]
    pub deploy_delay_ms: u64,

    /// Whether the unit flies.
    #[serde(default)]
    pub is_air: bool,
}

/// Default unit count for cards without an explicit count.
const fn default_unit_count() -> u32 {
    1
}

const fn zero() -> Fixed {
    Fixed::ZERO
}

/// One-shot area effect card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellCard {
    /// Unique string identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Elixir cost.
    pub cost: u32,

    /// Damage dealt to everything inside the radius.
    pub damage: u32,

    /// Effect radius in tiles.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

/// A playable card. Behavior is selected by matching on the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Card {
    /// Mobile unit(s) that advance toward targets.
    Troop(UnitCard),
    /// Immobile unit that only engages targets within range.
    Building(UnitCard),
    /// Area effect applied once shortly after casting.
    Spell(SpellCard),
}

impl Card {
    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Troop(unit) | Self::Building(unit) => &unit.id,
            Self::Spell(spell) => &spell.id,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Troop(unit) | Self::Building(unit) => &unit.name,
            Self::Spell(spell) => &spell.name,
        }
    }

    /// Elixir cost.
    #[must_use]
    pub fn cost(&self) -> u32 {
        match self {
            Self::Troop(unit) | Self::Building(unit) => unit.cost,
            Self::Spell(spell) => spell.cost,
        }
    }

    /// Unit stats for troop and building cards.
    #[must_use]
    pub fn unit(&self) -> Option<&UnitCard> {
        match self {
            Self::Troop(unit) | Self::Building(unit) => Some(unit),
            Self::Spell(_) => None,
        }
    }

    /// Check if this card is a spell.
    #[must_use]
    pub const fn is_spell(&self) -> bool {
        matches!(self, Self::Spell(_))
    }

    /// Validate the card's own fields, appending problems to `errors`.
    pub(crate) fn validate_into(&self, errors: &mut Vec<String>) {
        let id = self.id();
        if id.is_empty() {
            errors.push("Card with empty id".to_string());
        }
        let cost = self.cost();
        if cost == 0 || cost > 10 {
            errors.push(format!("Card '{id}' cost {cost} outside 1..=10"));
        }

        match self {
            Self::Troop(unit) | Self::Building(unit) => {
                if unit.health == 0 {
                    errors.push(format!("Card '{id}' has zero health"));
                }
                if unit.hit_speed_ms == 0 {
                    errors.push(format!("Card '{id}' has zero hit speed"));
                }
                if unit.range <= Fixed::ZERO {
                    errors.push(format!("Card '{id}' has non-positive range"));
                }
                if unit.unit_count == 0 {
                    errors.push(format!("Card '{id}' spawns zero units"));
                }
                if unit.move_speed < Fixed::ZERO {
                    errors.push(format!("Card '{id}' has negative move speed"));
                }
            }
            Self::Spell(spell) => {
                if spell.radius <= Fixed::ZERO {
                    errors.push(format!("Spell '{id}' has non-positive radius"));
                }
            }
        }

        if let Self::Troop(unit) = self {
            if unit.move_speed == Fixed::ZERO {
                errors.push(format!("Troop '{id}' cannot move"));
            }
        }
    }
}

/// Tower type. Each side has one king and two flank towers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Central, sturdier tower.
    King,
    /// Side tower guarding a lane.
    Flank,
}

impl TowerKind {
    /// Stable string name for snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::King => "king",
            Self::Flank => "flank",
        }
    }
}

/// Tower combat statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerData {
    /// Maximum health.
    pub health: u32,
    /// Damage per hit.
    pub damage: u32,
    /// Milliseconds between hits.
    pub hit_speed_ms: u64,
    /// Attack range in tiles.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
}

impl TowerData {
    pub(crate) fn validate_into(&self, label: &str, errors: &mut Vec<String>) {
        if self.health == 0 {
            errors.push(format!("Tower '{label}' has zero health"));
        }
        if self.hit_speed_ms == 0 {
            errors.push(format!("Tower '{label}' has zero hit speed"));
        }
        if self.range <= Fixed::ZERO {
            errors.push(format!("Tower '{label}' has non-positive range"));
        }
    }
}

/// Stats for both tower kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerTable {
    /// King tower stats.
    pub king: TowerData,
    /// Flank tower stats.
    pub flank: TowerData,
}

impl TowerTable {
    /// Stats for a tower kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &TowerData {
        match kind {
            TowerKind::King => &self.king,
            TowerKind::Flank => &self.flank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> UnitCard {
        UnitCard {
            id: "knight".to_string(),
            name: "Knight".to_string(),
            cost: 3,
            health: 1450,
            damage: 159,
            hit_speed_ms: 1100,
            range: Fixed::ONE,
            move_speed: Fixed::from_num(60),
            targets: TargetingClass::Ground,
            unit_count: 1,
            deploy_delay_ms: 1000,
            is_air: false,
        }
    }

    #[test]
    fn test_card_accessors() {
        let card = Card::Troop(knight());
        assert_eq!(card.id(), "knight");
        assert_eq!(card.cost(), 3);
        assert!(card.unit().is_some());
        assert!(!card.is_spell());
    }

    #[test]
    fn test_validate_valid_card() {
        let mut errors = Vec::new();
        Card::Troop(knight()).validate_into(&mut errors);
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_validate_flags_immobile_troop() {
        let mut unit = knight();
        unit.move_speed = Fixed::ZERO;

        let mut errors = Vec::new();
        Card::Troop(unit.clone()).validate_into(&mut errors);
        assert!(errors.iter().any(|e| e.contains("cannot move")));

        errors.clear();
        Card::Building(unit).validate_into(&mut errors);
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_parse_spell_from_ron() {
        let card: Card = ron::from_str(
            r#"Spell((id: "fireball", name: "Fireball", cost: 4, damage: 572, radius: 2.5))"#,
        )
        .unwrap();
        assert!(card.is_spell());
        assert_eq!(card.cost(), 4);
    }
}
