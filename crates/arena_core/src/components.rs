//! Battlefield record types.
//!
//! These are plain data. The per-tick behavior that drives them lives in
//! [`crate::systems`].

use serde::{Deserialize, Serialize};

use crate::data::{MatchRules, TargetingClass, TowerData, TowerKind, UnitCard};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Handle issued by the battlefield registry.
///
/// Handles increase monotonically for the whole match, so comparing two
/// handles compares creation order.
pub type EntityId = u64;

/// The two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The local player, bottom half of the arena.
    Home,
    /// The computer opponent, top half of the arena.
    Away,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Index for per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }
}

/// Weak reference to something that can be attacked.
///
/// Resolved through the battlefield every time it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// A deployed unit or building.
    Unit(EntityId),
    /// A tower.
    Tower(EntityId),
}

impl TargetRef {
    /// The referenced handle.
    #[must_use]
    pub const fn id(self) -> EntityId {
        match self {
            Self::Unit(id) | Self::Tower(id) => id,
        }
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create health at full capacity.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, clamping at zero.
    ///
    /// Returns `true` if this hit took the entity from alive to dead.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        let was_alive = !self.is_dead();
        self.current = self.current.saturating_sub(amount);
        was_alive && self.is_dead()
    }

    /// Check if health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Remaining health as a percentage in `[0, 100]`.
    #[must_use]
    pub fn percent(&self) -> Fixed {
        if self.max == 0 {
            return Fixed::ZERO;
        }
        Fixed::from_num(self.current) * Fixed::from_num(100) / Fixed::from_num(self.max)
    }
}

/// Unit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    /// Moving toward the current target.
    Advancing,
    /// Stationary and attacking.
    Engaging,
    /// Terminal.
    Defeated,
}

impl UnitState {
    /// Stable string name for snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advancing => "advancing",
            Self::Engaging => "engaging",
            Self::Defeated => "defeated",
        }
    }
}

/// Tower lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerState {
    /// No target in range.
    Idle,
    /// Attacking a unit in range.
    Engaging,
    /// Terminal.
    Destroyed,
}

impl TowerState {
    /// Stable string name for snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Engaging => "engaging",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Combat stats copied from the card at deploy time, with ranges already
/// converted to distance units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Damage per hit.
    pub damage: u32,
    /// Milliseconds between hits.
    pub hit_speed_ms: u64,
    /// Attack range in distance units.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Whether attacks spawn a cosmetic projectile.
    pub ranged: bool,
    /// Distance units per second.
    #[serde(with = "fixed_serde")]
    pub move_speed: Fixed,
    /// Targeting restriction.
    pub targets: TargetingClass,
    /// Whether the unit flies.
    pub is_air: bool,
    /// Whether the unit is a building (immobile, range-limited targeting).
    pub is_building: bool,
}

impl UnitStats {
    /// Derive stats from a card definition.
    #[must_use]
    pub fn from_card(card: &UnitCard, is_building: bool, rules: &MatchRules) -> Self {
        Self {
            damage: card.damage,
            hit_speed_ms: card.hit_speed_ms,
            range: rules.tiles(card.range),
            ranged: card.range > rules.melee_range_tiles,
            move_speed: if is_building {
                Fixed::ZERO
            } else {
                card.move_speed
            },
            targets: card.targets,
            is_air: card.is_air,
            is_building,
        }
    }
}

/// A deployed troop or building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEntity {
    /// Registry handle.
    pub id: EntityId,
    /// Card this unit came from.
    pub card_id: String,
    /// Owning side.
    pub side: Side,
    /// Position in arena units.
    pub position: Vec2Fixed,
    /// Health.
    pub health: Health,
    /// Lifecycle state.
    pub state: UnitState,
    /// Current target, resolved by handle each tick.
    pub target: Option<TargetRef>,
    /// Match time of the last attack.
    pub last_attack_ms: Option<u64>,
    /// Match time at which the deploy delay ends.
    pub active_at_ms: u64,
    /// Combat stats.
    pub stats: UnitStats,
}

impl CombatEntity {
    /// Check whether the unit can still act and be targeted.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Defeated
    }
}

/// Tower combat stats in distance units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage per hit.
    pub damage: u32,
    /// Milliseconds between hits.
    pub hit_speed_ms: u64,
    /// Attack range in distance units.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
}

impl TowerStats {
    /// Derive stats from tower data.
    #[must_use]
    pub fn from_data(data: &TowerData, rules: &MatchRules) -> Self {
        Self {
            damage: data.damage,
            hit_speed_ms: data.hit_speed_ms,
            range: rules.tiles(data.range),
        }
    }
}

/// A passive defender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tower {
    /// Registry handle.
    pub id: EntityId,
    /// Tower type.
    pub kind: TowerKind,
    /// Owning side.
    pub side: Side,
    /// Position in arena units.
    pub position: Vec2Fixed,
    /// Health.
    pub health: Health,
    /// Lifecycle state.
    pub state: TowerState,
    /// Current target unit.
    pub target: Option<EntityId>,
    /// Match time of the last attack.
    pub last_attack_ms: Option<u64>,
    /// Combat stats.
    pub stats: TowerStats,
}

impl Tower {
    /// Check whether the tower is still standing.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != TowerState::Destroyed
    }
}

/// A cast area effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    /// Registry handle.
    pub id: EntityId,
    /// Card this spell came from.
    pub card_id: String,
    /// Casting side. Only the other side is damaged.
    pub side: Side,
    /// Center of the effect.
    pub position: Vec2Fixed,
    /// Match time of the cast.
    pub cast_at_ms: u64,
    /// Set once the effect has fired.
    pub armed: bool,
    /// Damage applied when the effect fires.
    pub damage: u32,
    /// Effect radius in distance units.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Delay between cast and effect.
    pub arming_ms: u64,
    /// Time from cast to removal.
    pub lifetime_ms: u64,
}

/// Cosmetic travel marker from attacker to target.
///
/// Carries no gameplay effect; dropping one changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Registry handle.
    pub id: EntityId,
    /// Start point.
    pub origin: Vec2Fixed,
    /// End point.
    pub destination: Vec2Fixed,
    /// Travel progress in `[0, 1]`.
    #[serde(with = "fixed_serde")]
    pub progress: Fixed,
    /// Progress added per tick.
    #[serde(with = "fixed_serde")]
    pub step: Fixed,
}

impl Projectile {
    /// Current interpolated position.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        self.origin.lerp(self.destination, self.progress)
    }

    /// Check if the marker has arrived.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress >= Fixed::ONE
    }
}
