//! Per-tick simulation systems.
//!
//! Each system runs to completion over the whole battlefield before the next
//! one starts. Units and towers are visited in creation order.

use crate::battlefield::Battlefield;
use crate::components::{EntityId, Side, TargetRef, TowerState, UnitState};
use crate::data::{MatchRules, TowerKind};
use crate::math::Fixed;
use crate::targeting::{select_tower_target, select_unit_target};

/// Damage dealt during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    /// Attacking unit, tower or spell.
    pub source: EntityId,
    /// What was hit.
    pub target: TargetRef,
    /// Health removed.
    pub amount: u32,
    /// Whether the hit was fatal.
    pub killed: bool,
}

/// A tower that fell during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerDestroyed {
    /// Tower handle.
    pub id: EntityId,
    /// Owning side.
    pub side: Side,
    /// Tower type.
    pub kind: TowerKind,
}

/// Timing for one tick, in match milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTime {
    /// Elapsed match time after this tick's advance.
    pub now_ms: u64,
    /// Match time advanced this tick.
    pub delta_ms: u64,
}

fn cooldown_ready(last_attack_ms: Option<u64>, hit_speed_ms: u64, now_ms: u64) -> bool {
    last_attack_ms.map_or(true, |last| now_ms.saturating_sub(last) >= hit_speed_ms)
}

/// Update every unit: re-acquire stale targets, then move or attack.
///
/// Damage is applied the moment an attack fires. Ranged attackers also
/// leave a cosmetic projectile.
pub fn unit_system(field: &mut Battlefield, time: TickTime, rules: &MatchRules) -> Vec<DamageEvent> {
    let mut events = Vec::new();

    for id in field.entity_ids() {
        let Some(actor) = field.entity(id) else {
            continue;
        };
        // Killed earlier this tick, or still inside its deploy delay.
        if !actor.is_alive() || time.now_ms < actor.active_at_ms {
            continue;
        }

        let mut target = actor.target.filter(|t| {
            field.live_position(*t).is_some_and(|pos| {
                !actor.stats.is_building || actor.position.within(pos, actor.stats.range)
            })
        });
        if target.is_none() {
            target = select_unit_target(actor, field);
        }

        let Some(target_ref) = target else {
            if let Some(actor) = field.entity_mut(id) {
                actor.target = None;
                actor.state = UnitState::Advancing;
            }
            continue;
        };
        let Some(target_pos) = field.live_position(target_ref) else {
            continue;
        };

        let origin = actor.position;
        let stats = actor.stats;

        if origin.within(target_pos, stats.range) {
            let fire = cooldown_ready(actor.last_attack_ms, stats.hit_speed_ms, time.now_ms);
            if let Some(actor) = field.entity_mut(id) {
                actor.target = Some(target_ref);
                actor.state = UnitState::Engaging;
                if fire {
                    actor.last_attack_ms = Some(time.now_ms);
                }
            }
            if !fire {
                continue;
            }

            if let Some(outcome) = field.apply_damage(target_ref, stats.damage) {
                events.push(DamageEvent {
                    source: id,
                    target: target_ref,
                    amount: outcome.dealt,
                    killed: outcome.killed,
                });
            }
            if stats.ranged {
                field.spawn_projectile(origin, target_pos, rules.projectile_step);
            }
        } else {
            let mut position = origin;
            let distance = origin.distance(target_pos);
            if distance > rules.move_clamp && stats.move_speed > Fixed::ZERO {
                // Saturates on very long frames, then is capped at the distance.
                let elapsed = Fixed::saturating_from_num(time.delta_ms);
                let step = stats.move_speed.saturating_mul(elapsed) / Fixed::from_num(1000);
                let direction = (target_pos - origin).normalize();
                position = origin + direction.scale(step.min(distance));
            }
            let engaged = position.within(target_pos, stats.range);

            if let Some(actor) = field.entity_mut(id) {
                actor.target = Some(target_ref);
                actor.position = position;
                actor.state = if engaged {
                    UnitState::Engaging
                } else {
                    UnitState::Advancing
                };
            }
        }
    }

    events
}

/// Update every tower: keep a live in-range target or find a new one, and
/// fire when the cooldown allows.
pub fn tower_system(field: &mut Battlefield, time: TickTime, rules: &MatchRules) -> Vec<DamageEvent> {
    let mut events = Vec::new();

    for id in field.tower_ids() {
        let Some(tower) = field.tower(id) else {
            continue;
        };
        if !tower.is_alive() {
            continue;
        }

        let current = tower.target.filter(|unit| {
            field
                .live_position(TargetRef::Unit(*unit))
                .is_some_and(|pos| tower.position.within(pos, tower.stats.range))
        });
        let target = current.or_else(|| select_tower_target(tower, field));

        let Some(unit) = target else {
            if let Some(tower) = field.tower_mut(id) {
                tower.target = None;
                tower.state = TowerState::Idle;
            }
            continue;
        };
        let Some(target_pos) = field.live_position(TargetRef::Unit(unit)) else {
            continue;
        };

        let origin = tower.position;
        let stats = tower.stats;
        let fire = cooldown_ready(tower.last_attack_ms, stats.hit_speed_ms, time.now_ms);

        if let Some(tower) = field.tower_mut(id) {
            tower.target = Some(unit);
            tower.state = TowerState::Engaging;
            if fire {
                tower.last_attack_ms = Some(time.now_ms);
            }
        }
        if !fire {
            continue;
        }

        let target_ref = TargetRef::Unit(unit);
        if let Some(outcome) = field.apply_damage(target_ref, stats.damage) {
            events.push(DamageEvent {
                source: id,
                target: target_ref,
                amount: outcome.dealt,
                killed: outcome.killed,
            });
        }
        field.spawn_projectile(origin, target_pos, rules.projectile_step);
    }

    events
}

/// Advance projectiles and drop the ones that have arrived.
pub fn projectile_system(field: &mut Battlefield) {
    let projectiles = field.projectiles_mut();
    for projectile in projectiles.iter_mut() {
        projectile.progress = (projectile.progress + projectile.step).min(Fixed::ONE);
    }
    projectiles.retain(|p| !p.is_finished());
}

/// Fire armed spells once and expire spells past their lifetime.
///
/// The effect hits every opposing unit and tower whose distance to the
/// center is at most the radius at the instant the spell fires.
pub fn spell_system(field: &mut Battlefield, time: TickTime) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    let mut spells = std::mem::take(field.spells_mut());

    for spell in &mut spells {
        let age = time.now_ms.saturating_sub(spell.cast_at_ms);
        if spell.armed || age < spell.arming_ms {
            continue;
        }
        spell.armed = true;

        let center = spell.position;
        let mut hits: Vec<TargetRef> = field
            .entities()
            .iter()
            .filter(|e| e.side != spell.side && e.is_alive())
            .filter(|e| center.within(e.position, spell.radius))
            .map(|e| TargetRef::Unit(e.id))
            .collect();
        hits.extend(
            field
                .towers()
                .iter()
                .filter(|t| t.side != spell.side && t.is_alive())
                .filter(|t| center.within(t.position, spell.radius))
                .map(|t| TargetRef::Tower(t.id)),
        );

        for target in hits {
            if let Some(outcome) = field.apply_damage(target, spell.damage) {
                events.push(DamageEvent {
                    source: spell.id,
                    target,
                    amount: outcome.dealt,
                    killed: outcome.killed,
                });
            }
        }
        tracing::debug!(spell = spell.id, card = %spell.card_id, "Spell fired");
    }

    spells.retain(|s| time.now_ms.saturating_sub(s.cast_at_ms) < s.lifetime_ms);
    *field.spells_mut() = spells;

    events
}

/// Towers destroyed by a batch of damage events.
#[must_use]
pub fn destroyed_towers(field: &Battlefield, events: &[DamageEvent]) -> Vec<TowerDestroyed> {
    events
        .iter()
        .filter(|e| e.killed)
        .filter_map(|e| match e.target {
            TargetRef::Tower(id) => field.tower(id),
            TargetRef::Unit(_) => None,
        })
        .map(|t| TowerDestroyed {
            id: t.id,
            side: t.side,
            kind: t.kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::UnitSpawn;
    use crate::components::{Spell, UnitStats};
    use crate::data::{CardCatalog, TargetingClass};
    use crate::math::Vec2Fixed;

    fn rules() -> MatchRules {
        MatchRules::default()
    }

    fn field() -> Battlefield {
        let catalog = CardCatalog::builtin().unwrap();
        Battlefield::with_towers(catalog.layout(), catalog.towers(), catalog.rules())
    }

    fn melee() -> UnitStats {
        UnitStats {
            damage: 50,
            hit_speed_ms: 1000,
            range: Fixed::from_num(20),
            ranged: false,
            move_speed: Fixed::from_num(60),
            targets: TargetingClass::Ground,
            is_air: false,
            is_building: false,
        }
    }

    fn spawn(field: &mut Battlefield, side: Side, x: i32, y: i32, stats: UnitStats) -> EntityId {
        field.spawn_unit(UnitSpawn {
            card_id: "test".to_string(),
            side,
            position: Vec2Fixed::from_ints(x, y),
            health: 120,
            stats,
            active_at_ms: 0,
        })
    }

    fn at(now_ms: u64) -> TickTime {
        TickTime {
            now_ms,
            delta_ms: 100,
        }
    }

    #[test]
    fn test_unit_advances_toward_target() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 300, melee());
        spawn(&mut field, Side::Away, 187, 240, melee());

        unit_system(&mut field, at(100), &rules());

        let unit = field.entity(actor).unwrap();
        assert_eq!(unit.state, UnitState::Advancing);
        // 60 units/s for 100 ms.
        assert_eq!(unit.position, Vec2Fixed::from_ints(187, 294));
    }

    #[test]
    fn test_unit_attacks_on_cooldown() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 250, melee());
        let victim = spawn(&mut field, Side::Away, 187, 240, melee());

        let events = unit_system(&mut field, at(100), &rules());
        // Both sides swing on first contact.
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].source, actor);
        assert_eq!(field.entity(actor).unwrap().state, UnitState::Engaging);
        assert_eq!(field.entity(victim).unwrap().health.current, 70);

        // Not ready again until 1000 ms later.
        assert!(unit_system(&mut field, at(1_099), &rules())
            .iter()
            .all(|e| e.source != actor));
        assert!(unit_system(&mut field, at(1_100), &rules())
            .iter()
            .any(|e| e.source == actor));
    }

    #[test]
    fn test_ranged_attack_leaves_projectile() {
        let mut field = field();
        let mut archer = melee();
        archer.range = Fixed::from_num(110);
        archer.ranged = true;
        spawn(&mut field, Side::Home, 187, 300, archer);
        let victim = spawn(&mut field, Side::Away, 187, 220, melee());

        unit_system(&mut field, at(100), &rules());
        // Damage lands immediately, the projectile is cosmetic.
        assert_eq!(field.entity(victim).unwrap().health.current, 70);
        assert_eq!(field.projectiles().len(), 1);
    }

    #[test]
    fn test_stale_target_is_reacquired() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 250, melee());
        let first = spawn(&mut field, Side::Away, 187, 240, melee());
        let second = spawn(&mut field, Side::Away, 187, 200, melee());

        unit_system(&mut field, at(100), &rules());
        assert_eq!(field.entity(actor).unwrap().target, Some(TargetRef::Unit(first)));

        field.apply_damage(TargetRef::Unit(first), 1_000);
        field.purge_defeated();

        unit_system(&mut field, at(200), &rules());
        assert_eq!(field.entity(actor).unwrap().target, Some(TargetRef::Unit(second)));
    }

    #[test]
    fn test_deploy_delay_keeps_unit_inert() {
        let mut field = field();
        let actor = field.spawn_unit(UnitSpawn {
            card_id: "test".to_string(),
            side: Side::Home,
            position: Vec2Fixed::from_ints(187, 300),
            health: 100,
            stats: melee(),
            active_at_ms: 1_000,
        });

        unit_system(&mut field, at(500), &rules());
        let unit = field.entity(actor).unwrap();
        assert_eq!(unit.position, Vec2Fixed::from_ints(187, 300));
        assert_eq!(unit.target, None);

        unit_system(&mut field, at(1_000), &rules());
        assert!(field.entity(actor).unwrap().target.is_some());
    }

    #[test]
    fn test_tower_engages_and_idles() {
        let mut field = field();
        let intruder = spawn(&mut field, Side::Away, 70, 300, melee());

        let events = tower_system(&mut field, at(100), &rules());
        // Home left flank (70, 350) is in range; home king (187, 420) is too.
        assert!(events.iter().all(|e| e.target == TargetRef::Unit(intruder)));
        assert!(!events.is_empty());
        assert!(field
            .towers()
            .iter()
            .filter(|t| t.side == Side::Away)
            .all(|t| t.state == TowerState::Idle));

        field.apply_damage(TargetRef::Unit(intruder), 1_000);
        field.purge_defeated();
        tower_system(&mut field, at(200), &rules());
        assert!(field.towers().iter().all(|t| t.state == TowerState::Idle));
    }

    #[test]
    fn test_projectiles_expire() {
        let mut field = field();
        field.spawn_projectile(
            Vec2Fixed::from_ints(0, 0),
            Vec2Fixed::from_ints(10, 0),
            Fixed::from_num(0.5),
        );
        projectile_system(&mut field);
        assert_eq!(field.projectiles()[0].progress, Fixed::from_num(0.5));
        projectile_system(&mut field);
        assert!(field.projectiles().is_empty());
    }

    fn fireball(field: &mut Battlefield, position: Vec2Fixed) -> EntityId {
        field.spawn_spell(Spell {
            id: 0,
            card_id: "fireball".to_string(),
            side: Side::Home,
            position,
            cast_at_ms: 0,
            armed: false,
            damage: 100,
            radius: Fixed::from_num(50),
            arming_ms: 50,
            lifetime_ms: 1_000,
        })
    }

    #[test]
    fn test_spell_fires_exactly_once() {
        let mut field = field();
        let inside = spawn(&mut field, Side::Away, 187, 200, melee());
        let edge = spawn(&mut field, Side::Away, 237, 200, melee());
        let outside = spawn(&mut field, Side::Away, 238, 200, melee());
        let friend = spawn(&mut field, Side::Home, 187, 200, melee());
        fireball(&mut field, Vec2Fixed::from_ints(187, 200));

        assert!(spell_system(&mut field, at(49)).is_empty());

        let events = spell_system(&mut field, at(50));
        assert_eq!(events.len(), 2);
        assert_eq!(field.entity(inside).unwrap().health.current, 20);
        assert_eq!(field.entity(edge).unwrap().health.current, 20);
        assert_eq!(field.entity(outside).unwrap().health.current, 120);
        assert_eq!(field.entity(friend).unwrap().health.current, 120);

        assert!(spell_system(&mut field, at(500)).is_empty());
        assert_eq!(field.spells().len(), 1);
        spell_system(&mut field, at(1_000));
        assert!(field.spells().is_empty());
    }

    #[test]
    fn test_spell_damages_towers_and_reports_destruction() {
        let mut field = field();
        let tower = field
            .towers()
            .iter()
            .find(|t| t.side == Side::Away && t.kind == TowerKind::Flank)
            .unwrap()
            .clone();
        if let Some(t) = field.tower_mut(tower.id) {
            t.health.current = 50;
        }
        fireball(&mut field, tower.position);

        let events = spell_system(&mut field, at(100));
        let fallen = destroyed_towers(&field, &events);
        assert_eq!(fallen.len(), 1);
        assert_eq!(fallen[0].id, tower.id);
        assert_eq!(field.alive_towers(Side::Away), 2);
    }
}
