//! Target selection.
//!
//! Pure queries over the battlefield. Candidates are scanned in creation
//! order and the first minimum-distance candidate wins, so equal distances
//! always resolve to the oldest candidate.

use crate::battlefield::Battlefield;
use crate::components::{CombatEntity, EntityId, TargetRef, Tower};
use crate::data::TargetingClass;
use crate::math::Vec2Fixed;

/// Check whether a unit may select `candidate` as a target.
#[must_use]
pub fn is_eligible(class: TargetingClass, candidate: &CombatEntity) -> bool {
    match class {
        TargetingClass::Ground => !candidate.stats.is_air,
        TargetingClass::AirAndGround => true,
        TargetingClass::Buildings => candidate.stats.is_building,
    }
}

/// Nearest item by squared distance; the first of equal minima wins.
fn nearest<I>(origin: Vec2Fixed, candidates: I) -> Option<EntityId>
where
    I: Iterator<Item = (EntityId, Vec2Fixed)>,
{
    candidates
        .min_by_key(|(_, pos)| origin.distance_squared(*pos).to_bits())
        .map(|(id, _)| id)
}

/// Pick a target for a unit.
///
/// Live opposing units allowed by the actor's targeting class come first.
/// Only when none qualify does the actor fall back to opposing towers.
/// Buildings never chase, so they only consider candidates within range.
#[must_use]
pub fn select_unit_target(actor: &CombatEntity, field: &Battlefield) -> Option<TargetRef> {
    debug_assert!(actor.is_alive(), "defeated unit {} selecting a target", actor.id);

    let origin = actor.position;
    let enemy = actor.side.opponent();
    let reach = |pos: Vec2Fixed| !actor.stats.is_building || origin.within(pos, actor.stats.range);

    let unit = nearest(
        origin,
        field
            .entities()
            .iter()
            .filter(|e| e.side == enemy && e.is_alive())
            .filter(|e| is_eligible(actor.stats.targets, e))
            .filter(|e| reach(e.position))
            .map(|e| (e.id, e.position)),
    );
    if let Some(id) = unit {
        return Some(TargetRef::Unit(id));
    }

    nearest(
        origin,
        field
            .towers()
            .iter()
            .filter(|t| t.side == enemy && t.is_alive())
            .filter(|t| reach(t.position))
            .map(|t| (t.id, t.position)),
    )
    .map(TargetRef::Tower)
}

/// Pick a target for a tower: the nearest live opposing unit within range.
///
/// Towers never target other towers.
#[must_use]
pub fn select_tower_target(tower: &Tower, field: &Battlefield) -> Option<EntityId> {
    nearest(
        tower.position,
        field
            .entities()
            .iter()
            .filter(|e| e.side == tower.side.opponent() && e.is_alive())
            .filter(|e| tower.position.within(e.position, tower.stats.range))
            .map(|e| (e.id, e.position)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::UnitSpawn;
    use crate::components::{Side, UnitStats};
    use crate::data::CardCatalog;
    use crate::math::Fixed;

    fn stats(targets: TargetingClass) -> UnitStats {
        UnitStats {
            damage: 10,
            hit_speed_ms: 1000,
            range: Fixed::from_num(20),
            ranged: false,
            move_speed: Fixed::from_num(60),
            targets,
            is_air: false,
            is_building: false,
        }
    }

    fn field() -> Battlefield {
        let catalog = CardCatalog::builtin().unwrap();
        Battlefield::with_towers(catalog.layout(), catalog.towers(), catalog.rules())
    }

    fn spawn(field: &mut Battlefield, side: Side, x: i32, y: i32, stats: UnitStats) -> EntityId {
        field.spawn_unit(UnitSpawn {
            card_id: "test".to_string(),
            side,
            position: Vec2Fixed::from_ints(x, y),
            health: 100,
            stats,
            active_at_ms: 0,
        })
    }

    #[test]
    fn test_nearest_opposing_unit_wins() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 300, stats(TargetingClass::Ground));
        let _far = spawn(&mut field, Side::Away, 187, 200, stats(TargetingClass::Ground));
        let near = spawn(&mut field, Side::Away, 187, 260, stats(TargetingClass::Ground));
        let _friend = spawn(&mut field, Side::Home, 187, 299, stats(TargetingClass::Ground));

        let actor = field.entity(actor).unwrap();
        assert_eq!(select_unit_target(actor, &field), Some(TargetRef::Unit(near)));
    }

    #[test]
    fn test_tie_goes_to_earliest_created() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 300, stats(TargetingClass::Ground));
        let first = spawn(&mut field, Side::Away, 167, 300, stats(TargetingClass::Ground));
        let _second = spawn(&mut field, Side::Away, 207, 300, stats(TargetingClass::Ground));

        let actor = field.entity(actor).unwrap();
        assert_eq!(select_unit_target(actor, &field), Some(TargetRef::Unit(first)));
    }

    #[test]
    fn test_ground_ignores_air_and_falls_back_to_towers() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 70, 300, stats(TargetingClass::Ground));
        let mut flyer = stats(TargetingClass::AirAndGround);
        flyer.is_air = true;
        spawn(&mut field, Side::Away, 70, 290, flyer);

        let actor = field.entity(actor).unwrap();
        let target = select_unit_target(actor, &field).unwrap();
        let TargetRef::Tower(id) = target else {
            panic!("expected tower target, got {target:?}");
        };
        let tower = field.tower(id).unwrap();
        assert_eq!(tower.side, Side::Away);
        // Left flank tower at (70, 120) is nearest.
        assert_eq!(tower.position, Vec2Fixed::from_ints(70, 120));
    }

    #[test]
    fn test_buildings_only_skips_troops() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 305, 300, stats(TargetingClass::Buildings));
        spawn(&mut field, Side::Away, 305, 290, stats(TargetingClass::Ground));
        let mut cannon = stats(TargetingClass::Ground);
        cannon.is_building = true;
        let building = spawn(&mut field, Side::Away, 305, 200, cannon);

        let actor = field.entity(actor).unwrap();
        assert_eq!(select_unit_target(actor, &field), Some(TargetRef::Unit(building)));
    }

    #[test]
    fn test_defeated_units_are_never_selected() {
        let mut field = field();
        let actor = spawn(&mut field, Side::Home, 187, 300, stats(TargetingClass::Ground));
        let dead = spawn(&mut field, Side::Away, 187, 290, stats(TargetingClass::Ground));
        let alive = spawn(&mut field, Side::Away, 187, 250, stats(TargetingClass::Ground));
        field.apply_damage(TargetRef::Unit(dead), 1_000);

        let actor = field.entity(actor).unwrap();
        assert_eq!(select_unit_target(actor, &field), Some(TargetRef::Unit(alive)));
    }

    #[test]
    fn test_tower_only_targets_units_in_range() {
        let mut field = field();
        // Home left flank at (70, 350), range 7.5 tiles = 150 units.
        let tower = field.towers()[1].clone();
        assert_eq!(tower.position, Vec2Fixed::from_ints(70, 350));

        let out_of_range = spawn(&mut field, Side::Away, 70, 150, stats(TargetingClass::Ground));
        assert_eq!(select_tower_target(&tower, &field), None);

        let edge = spawn(&mut field, Side::Away, 70, 200, stats(TargetingClass::Ground));
        assert_eq!(select_tower_target(&tower, &field), Some(edge));
        assert_ne!(Some(out_of_range), select_tower_target(&tower, &field));
    }

    #[test]
    fn test_building_does_not_reach_past_range() {
        let mut field = field();
        let mut cannon = stats(TargetingClass::Ground);
        cannon.is_building = true;
        cannon.range = Fixed::from_num(110);
        let actor = spawn(&mut field, Side::Home, 187, 300, cannon);
        assert_eq!(select_unit_target(field.entity(actor).unwrap(), &field), None);

        let close = spawn(&mut field, Side::Away, 187, 200, stats(TargetingClass::Ground));
        assert_eq!(
            select_unit_target(field.entity(actor).unwrap(), &field),
            Some(TargetRef::Unit(close))
        );
    }
}
