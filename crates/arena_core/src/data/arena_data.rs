//! Arena geometry and match rule constants.

use serde::{Deserialize, Serialize};

use super::card_data::TowerKind;
use crate::components::Side;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Where a tower stands at match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerSlot {
    /// Tower type.
    pub kind: TowerKind,
    /// Owning side.
    pub side: Side,
    /// Position in arena units.
    pub position: Vec2Fixed,
}

/// Arena dimensions and tower placement.
///
/// The home side owns the bottom half (large y), the away side the top half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Arena width in distance units.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Arena height in distance units.
    #[serde(with = "fixed_serde")]
    pub height: Fixed,
    /// Y coordinate of the river splitting the two halves.
    #[serde(with = "fixed_serde")]
    pub river_y: Fixed,
    /// Lowest y the AI picks for random deploys, keeping clear of its towers.
    #[serde(with = "fixed_serde")]
    pub ai_deploy_min_y: Fixed,
    /// Tower placements, three per side.
    pub towers: Vec<TowerSlot>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        let slot = |kind, side, x, y| TowerSlot {
            kind,
            side,
            position: Vec2Fixed::from_ints(x, y),
        };

        Self {
            width: Fixed::from_num(375),
            height: Fixed::from_num(470),
            river_y: Fixed::from_num(235),
            ai_deploy_min_y: Fixed::from_num(50),
            towers: vec![
                slot(TowerKind::King, Side::Home, 187, 420),
                slot(TowerKind::Flank, Side::Home, 70, 350),
                slot(TowerKind::Flank, Side::Home, 305, 350),
                slot(TowerKind::King, Side::Away, 187, 50),
                slot(TowerKind::Flank, Side::Away, 70, 120),
                slot(TowerKind::Flank, Side::Away, 305, 120),
            ],
        }
    }
}

impl ArenaLayout {
    /// Check if a point lies inside the arena.
    #[must_use]
    pub fn contains(&self, position: Vec2Fixed) -> bool {
        position.x >= Fixed::ZERO
            && position.x <= self.width
            && position.y >= Fixed::ZERO
            && position.y <= self.height
    }

    /// Check if a side may place units at a point.
    #[must_use]
    pub fn in_deploy_region(&self, side: Side, position: Vec2Fixed) -> bool {
        if !self.contains(position) {
            return false;
        }
        match side {
            Side::Home => position.y >= self.river_y,
            Side::Away => position.y <= self.river_y,
        }
    }

    pub(crate) fn validate_into(&self, errors: &mut Vec<String>) {
        if self.width <= Fixed::ZERO || self.height <= Fixed::ZERO {
            errors.push("Arena dimensions must be positive".to_string());
        }
        if self.river_y <= Fixed::ZERO || self.river_y >= self.height {
            errors.push("River must lie inside the arena".to_string());
        }
        if self.ai_deploy_min_y < Fixed::ZERO || self.ai_deploy_min_y >= self.river_y {
            errors.push("AI deploy band must lie above the river".to_string());
        }

        for side in [Side::Home, Side::Away] {
            let count = self.towers.iter().filter(|t| t.side == side).count();
            if count != 3 {
                errors.push(format!("{side:?} has {count} towers, expected 3"));
            }
        }

        for tower in &self.towers {
            if !self.contains(tower.position) {
                errors.push(format!("{:?} {:?} tower outside arena", tower.side, tower.kind));
            }
        }
    }
}

/// Timing and scale constants for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Match length in milliseconds.
    pub battle_duration_ms: u64,
    /// Milliseconds of match time per elixir unit.
    pub elixir_rate_ms: u64,
    /// Elixir ceiling.
    pub max_elixir: u32,
    /// Elixir each side starts with.
    pub starting_elixir: u32,
    /// Distance units per tile.
    #[serde(with = "fixed_serde")]
    pub tile_size: Fixed,
    /// Ranges at or below this many tiles are melee (no projectile).
    #[serde(with = "fixed_serde")]
    pub melee_range_tiles: Fixed,
    /// Units closer than this to their target stop moving.
    #[serde(with = "fixed_serde")]
    pub move_clamp: Fixed,
    /// Delay between casting a spell and its effect.
    pub spell_arming_ms: u64,
    /// Time a spell stays on the field after casting.
    pub spell_lifetime_ms: u64,
    /// Projectile progress per tick.
    #[serde(with = "fixed_serde")]
    pub projectile_step: Fixed,
    /// Lateral distance between units of a multi-unit card.
    #[serde(with = "fixed_serde")]
    pub unit_spread: Fixed,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            battle_duration_ms: 180_000,
            elixir_rate_ms: 2_800,
            max_elixir: 10,
            starting_elixir: 5,
            tile_size: Fixed::from_num(20),
            melee_range_tiles: Fixed::ONE,
            move_clamp: Fixed::from_num(5),
            spell_arming_ms: 50,
            spell_lifetime_ms: 1_000,
            projectile_step: Fixed::from_num(0.05),
            unit_spread: Fixed::from_num(20),
        }
    }
}

impl MatchRules {
    /// Convert a tile count to distance units.
    #[must_use]
    pub fn tiles(&self, tiles: Fixed) -> Fixed {
        tiles * self.tile_size
    }

    pub(crate) fn validate_into(&self, errors: &mut Vec<String>) {
        if self.battle_duration_ms == 0 {
            errors.push("Battle duration must be positive".to_string());
        }
        if self.elixir_rate_ms == 0 {
            errors.push("Elixir rate must be positive".to_string());
        }
        if self.max_elixir == 0 {
            errors.push("Max elixir must be positive".to_string());
        }
        if self.starting_elixir > self.max_elixir {
            errors.push("Starting elixir exceeds max elixir".to_string());
        }
        if self.tile_size <= Fixed::ZERO {
            errors.push("Tile size must be positive".to_string());
        }
        if self.spell_lifetime_ms < self.spell_arming_ms {
            errors.push("Spell lifetime shorter than arming delay".to_string());
        }
        if self.projectile_step <= Fixed::ZERO {
            errors.push("Projectile step must be positive".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let mut errors = Vec::new();
        ArenaLayout::default().validate_into(&mut errors);
        MatchRules::default().validate_into(&mut errors);
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_deploy_regions_split_at_river() {
        let layout = ArenaLayout::default();
        let home_half = Vec2Fixed::from_ints(100, 400);
        let away_half = Vec2Fixed::from_ints(100, 100);

        assert!(layout.in_deploy_region(Side::Home, home_half));
        assert!(!layout.in_deploy_region(Side::Home, away_half));
        assert!(layout.in_deploy_region(Side::Away, away_half));
        assert!(!layout.in_deploy_region(Side::Away, Vec2Fixed::from_ints(-1, 100)));
    }

    #[test]
    fn test_layout_requires_three_towers_per_side() {
        let mut layout = ArenaLayout::default();
        layout.towers.pop();

        let mut errors = Vec::new();
        layout.validate_into(&mut errors);
        assert!(errors.iter().any(|e| e.contains("Away has 2 towers")));
    }

    #[test]
    fn test_tiles_conversion() {
        let rules = MatchRules::default();
        assert_eq!(rules.tiles(Fixed::from_num(5.5)), Fixed::from_num(110));
    }
}
