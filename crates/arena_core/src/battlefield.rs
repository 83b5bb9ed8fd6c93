//! The shared battlefield aggregate.
//!
//! Owns every unit, tower, spell and projectile in a match and issues their
//! handles. Collections are kept in creation order, which is also handle
//! order, so lookups are a binary search and every iteration is
//! deterministic.

use serde::{Deserialize, Serialize};

use crate::components::{
    CombatEntity, EntityId, Health, Projectile, Side, Spell, TargetRef, Tower, TowerState,
    TowerStats, UnitState, UnitStats,
};
use crate::data::{ArenaLayout, MatchRules, TowerTable};
use crate::math::{Fixed, Vec2Fixed};

/// Result of applying damage to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed.
    pub dealt: u32,
    /// Whether this hit defeated the target.
    pub killed: bool,
}

/// Parameters for spawning a unit.
#[derive(Debug, Clone)]
pub struct UnitSpawn {
    /// Card the unit came from.
    pub card_id: String,
    /// Owning side.
    pub side: Side,
    /// Spawn point.
    pub position: Vec2Fixed,
    /// Maximum health.
    pub health: u32,
    /// Combat stats.
    pub stats: UnitStats,
    /// Match time at which the unit starts acting.
    pub active_at_ms: u64,
}

/// Registry and storage for everything on the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlefield {
    next_id: EntityId,
    entities: Vec<CombatEntity>,
    towers: Vec<Tower>,
    spells: Vec<Spell>,
    projectiles: Vec<Projectile>,
}

impl Battlefield {
    /// Create an empty battlefield.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Create a battlefield with the six starting towers.
    #[must_use]
    pub fn with_towers(layout: &ArenaLayout, table: &TowerTable, rules: &MatchRules) -> Self {
        let mut field = Self::new();
        for slot in &layout.towers {
            let data = table.get(slot.kind);
            let id = field.issue_id();
            field.towers.push(Tower {
                id,
                kind: slot.kind,
                side: slot.side,
                position: slot.position,
                health: Health::new(data.health),
                state: TowerState::Idle,
                target: None,
                last_attack_ms: None,
                stats: TowerStats::from_data(data, rules),
            });
        }
        field
    }

    fn issue_id(&mut self) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Insert a unit and return its handle.
    pub fn spawn_unit(&mut self, spawn: UnitSpawn) -> EntityId {
        let id = self.issue_id();
        self.entities.push(CombatEntity {
            id,
            card_id: spawn.card_id,
            side: spawn.side,
            position: spawn.position,
            health: Health::new(spawn.health),
            state: UnitState::Advancing,
            target: None,
            last_attack_ms: None,
            active_at_ms: spawn.active_at_ms,
            stats: spawn.stats,
        });
        id
    }

    /// Insert a spell and return its handle. The `id` field is overwritten.
    pub fn spawn_spell(&mut self, mut spell: Spell) -> EntityId {
        let id = self.issue_id();
        spell.id = id;
        self.spells.push(spell);
        id
    }

    /// Insert a cosmetic projectile.
    pub fn spawn_projectile(&mut self, origin: Vec2Fixed, destination: Vec2Fixed, step: Fixed) {
        let id = self.issue_id();
        self.projectiles.push(Projectile {
            id,
            origin,
            destination,
            progress: Fixed::ZERO,
            step,
        });
    }

    /// All units, in creation order.
    #[must_use]
    pub fn entities(&self) -> &[CombatEntity] {
        &self.entities
    }

    /// All towers, in creation order.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Active spells.
    #[must_use]
    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub(crate) fn spells_mut(&mut self) -> &mut Vec<Spell> {
        &mut self.spells
    }

    pub(crate) fn projectiles_mut(&mut self) -> &mut Vec<Projectile> {
        &mut self.projectiles
    }

    /// Look up a unit by handle.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&CombatEntity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    /// Mutable unit lookup.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut CombatEntity> {
        match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(i) => Some(&mut self.entities[i]),
            Err(_) => None,
        }
    }

    /// Look up a tower by handle.
    #[must_use]
    pub fn tower(&self, id: EntityId) -> Option<&Tower> {
        self.towers
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|i| &self.towers[i])
    }

    /// Mutable tower lookup.
    pub fn tower_mut(&mut self, id: EntityId) -> Option<&mut Tower> {
        match self.towers.binary_search_by_key(&id, |t| t.id) {
            Ok(i) => Some(&mut self.towers[i]),
            Err(_) => None,
        }
    }

    /// Handles of every unit, in creation order.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Handles of every tower, in creation order.
    #[must_use]
    pub fn tower_ids(&self) -> Vec<EntityId> {
        self.towers.iter().map(|t| t.id).collect()
    }

    /// Position of a target if it still resolves to something alive.
    ///
    /// Stale references (removed, defeated or destroyed) yield `None`.
    #[must_use]
    pub fn live_position(&self, target: TargetRef) -> Option<Vec2Fixed> {
        match target {
            TargetRef::Unit(id) => self
                .entity(id)
                .filter(|e| e.is_alive())
                .map(|e| e.position),
            TargetRef::Tower(id) => self
                .tower(id)
                .filter(|t| t.is_alive())
                .map(|t| t.position),
        }
    }

    /// Apply damage to a target, clamping health at zero.
    ///
    /// A target that drops to zero becomes `Defeated`/`Destroyed` and drops
    /// its own target. Returns `None` if the reference is stale.
    pub fn apply_damage(&mut self, target: TargetRef, amount: u32) -> Option<DamageOutcome> {
        match target {
            TargetRef::Unit(id) => {
                let entity = self.entity_mut(id).filter(|e| e.is_alive())?;
                let before = entity.health.current;
                let killed = entity.health.apply_damage(amount);
                if killed {
                    entity.state = UnitState::Defeated;
                    entity.target = None;
                }
                Some(DamageOutcome {
                    dealt: before - entity.health.current,
                    killed,
                })
            }
            TargetRef::Tower(id) => {
                let tower = self.tower_mut(id).filter(|t| t.is_alive())?;
                let before = tower.health.current;
                let killed = tower.health.apply_damage(amount);
                if killed {
                    tower.state = TowerState::Destroyed;
                    tower.target = None;
                }
                Some(DamageOutcome {
                    dealt: before - tower.health.current,
                    killed,
                })
            }
        }
    }

    /// Remove defeated units, returning their handles.
    pub fn purge_defeated(&mut self) -> Vec<EntityId> {
        let purged: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| !e.is_alive())
            .map(|e| e.id)
            .collect();
        self.entities.retain(CombatEntity::is_alive);
        purged
    }

    /// Count standing towers for a side.
    #[must_use]
    pub fn alive_towers(&self, side: Side) -> usize {
        self.towers
            .iter()
            .filter(|t| t.side == side && t.is_alive())
            .count()
    }

    /// Count live units for a side.
    #[must_use]
    pub fn alive_units(&self, side: Side) -> usize {
        self.entities
            .iter()
            .filter(|e| e.side == side && e.is_alive())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TargetingClass, TowerKind};

    fn stats() -> UnitStats {
        UnitStats {
            damage: 10,
            hit_speed_ms: 1000,
            range: Fixed::from_num(20),
            ranged: false,
            move_speed: Fixed::from_num(60),
            targets: TargetingClass::Ground,
            is_air: false,
            is_building: false,
        }
    }

    fn spawn(field: &mut Battlefield, side: Side, x: i32, y: i32) -> EntityId {
        field.spawn_unit(UnitSpawn {
            card_id: "knight".to_string(),
            side,
            position: Vec2Fixed::from_ints(x, y),
            health: 100,
            stats: stats(),
            active_at_ms: 0,
        })
    }

    fn field() -> Battlefield {
        let catalog = crate::data::CardCatalog::builtin().unwrap();
        Battlefield::with_towers(catalog.layout(), catalog.towers(), catalog.rules())
    }

    #[test]
    fn test_starting_towers() {
        let field = field();
        assert_eq!(field.towers().len(), 6);
        assert_eq!(field.alive_towers(Side::Home), 3);
        assert_eq!(field.alive_towers(Side::Away), 3);
        let kings = field
            .towers()
            .iter()
            .filter(|t| t.kind == TowerKind::King)
            .count();
        assert_eq!(kings, 2);
    }

    #[test]
    fn test_handles_are_monotonic() {
        let mut field = field();
        let a = spawn(&mut field, Side::Home, 100, 400);
        let b = spawn(&mut field, Side::Home, 100, 400);
        assert!(b > a);
        assert!(field.towers().iter().all(|t| t.id < a));
        assert_eq!(field.entity(b).map(|e| e.id), Some(b));
    }

    #[test]
    fn test_damage_defeats_and_reference_goes_stale() {
        let mut field = field();
        let id = spawn(&mut field, Side::Away, 100, 100);
        let target = TargetRef::Unit(id);

        assert_eq!(field.alive_units(Side::Away), 1);
        let hit = field.apply_damage(target, 60).unwrap();
        assert_eq!(hit, DamageOutcome { dealt: 60, killed: false });

        let hit = field.apply_damage(target, 60).unwrap();
        assert_eq!(hit, DamageOutcome { dealt: 40, killed: true });
        assert_eq!(field.entity(id).unwrap().health.current, 0);
        assert_eq!(field.entity(id).unwrap().state, UnitState::Defeated);

        assert!(field.live_position(target).is_none());
        assert!(field.apply_damage(target, 1).is_none());
        assert_eq!(field.alive_units(Side::Away), 0);

        assert_eq!(field.purge_defeated(), vec![id]);
        assert!(field.entity(id).is_none());
    }

    #[test]
    fn test_destroyed_tower_stays_listed() {
        let mut field = field();
        let tower_id = field.towers()[1].id;
        let hit = field.apply_damage(TargetRef::Tower(tower_id), 1_000_000).unwrap();
        assert!(hit.killed);
        assert_eq!(field.towers().len(), 6);
        assert_eq!(field.alive_towers(Side::Home), 2);
        assert_eq!(field.tower(tower_id).unwrap().state, TowerState::Destroyed);
    }
}
