//! Computer opponent.
//!
//! The controller is polled every tick but only acts once per action
//! interval. When it acts it picks an affordable card at random and a random
//! point in its own half, clear of its tower line. Spells are aimed at a
//! random opposing unit when one exists.

use serde::{Deserialize, Serialize};

use crate::battlefield::Battlefield;
use crate::components::Side;
use crate::data::{ArenaLayout, CardCatalog};
use crate::economy::EconomyTracker;
use crate::math::Vec2Fixed;
use crate::rng::RandomSource;

/// A deploy the controller wants to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiDecision {
    /// Card to play.
    pub card_id: String,
    /// Where to play it.
    pub position: Vec2Fixed,
}

/// Timer-gated opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiController {
    side: Side,
    pool: Vec<String>,
    interval_ms: u64,
    last_action_ms: u64,
}

impl AiController {
    /// Create a controller for `side` choosing from `pool`.
    #[must_use]
    pub fn new(side: Side, pool: Vec<String>, interval_ms: u64) -> Self {
        Self {
            side,
            pool,
            interval_ms,
            last_action_ms: 0,
        }
    }

    /// Side this controller plays.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Milliseconds between actions.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Change the action interval. The current timer is kept.
    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Match time of the last action.
    #[must_use]
    pub const fn last_action_ms(&self) -> u64 {
        self.last_action_ms
    }

    /// Restart the action timer at `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_action_ms = now_ms;
    }

    /// Act if the interval has elapsed.
    ///
    /// The timer resets whenever the interval elapses, even if nothing was
    /// affordable.
    pub fn poll(
        &mut self,
        now_ms: u64,
        catalog: &CardCatalog,
        economy: &EconomyTracker,
        field: &Battlefield,
        rng: &mut impl RandomSource,
    ) -> Option<AiDecision> {
        if now_ms.saturating_sub(self.last_action_ms) < self.interval_ms {
            return None;
        }
        self.last_action_ms = now_ms;

        let decision = choose(self.side, &self.pool, catalog, economy, field, rng);
        if decision.is_none() {
            tracing::trace!(side = ?self.side, "AI idle, nothing affordable");
        }
        decision
    }
}

/// Pick an affordable card from `cards` and a position for it.
///
/// Returns `None` without touching the random source when nothing is
/// affordable.
pub fn choose(
    side: Side,
    cards: &[String],
    catalog: &CardCatalog,
    economy: &EconomyTracker,
    field: &Battlefield,
    rng: &mut impl RandomSource,
) -> Option<AiDecision> {
    let affordable: Vec<&String> = cards
        .iter()
        .filter(|id| {
            catalog
                .card(id)
                .is_some_and(|card| economy.can_afford(side, card.cost()))
        })
        .collect();
    if affordable.is_empty() {
        return None;
    }

    let card_id = affordable[rng.pick_index(affordable.len())].clone();
    let mut position = random_point(side, catalog.layout(), rng);

    if catalog.card(&card_id).is_some_and(|card| card.is_spell()) {
        let targets: Vec<Vec2Fixed> = field
            .entities()
            .iter()
            .filter(|e| e.side == side.opponent() && e.is_alive())
            .map(|e| e.position)
            .collect();
        if !targets.is_empty() {
            position = targets[rng.pick_index(targets.len())];
        }
    }

    Some(AiDecision { card_id, position })
}

/// Uniform point in a side's half, between the tower line and the river.
fn random_point(side: Side, layout: &ArenaLayout, rng: &mut impl RandomSource) -> Vec2Fixed {
    let x = rng.unit_fraction() * layout.width;
    let band = layout.river_y - layout.ai_deploy_min_y;
    let y = layout.ai_deploy_min_y + rng.unit_fraction() * band;
    match side {
        Side::Away => Vec2Fixed::new(x, y),
        Side::Home => Vec2Fixed::new(x, layout.height - y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::UnitSpawn;
    use crate::components::UnitStats;
    use crate::data::MatchRules;
    use crate::math::Fixed;
    use crate::rng::seeded;

    fn setup() -> (CardCatalog, EconomyTracker, Battlefield) {
        let catalog = CardCatalog::builtin().unwrap();
        let economy = EconomyTracker::new(catalog.rules());
        let field = Battlefield::with_towers(catalog.layout(), catalog.towers(), catalog.rules());
        (catalog, economy, field)
    }

    fn controller(catalog: &CardCatalog) -> AiController {
        AiController::new(Side::Away, catalog.ai_pool().to_vec(), 3_000)
    }

    #[test]
    fn test_waits_for_interval() {
        let (catalog, economy, field) = setup();
        let mut ai = controller(&catalog);
        let mut rng = seeded(3);

        assert!(ai.poll(2_999, &catalog, &economy, &field, &mut rng).is_none());
        assert_eq!(ai.last_action_ms(), 0);
        assert!(ai.poll(3_000, &catalog, &economy, &field, &mut rng).is_some());
        assert!(ai.poll(5_999, &catalog, &economy, &field, &mut rng).is_none());
        assert!(ai.poll(6_000, &catalog, &economy, &field, &mut rng).is_some());
    }

    #[test]
    fn test_timer_resets_when_broke() {
        let (catalog, mut economy, field) = setup();
        assert!(economy.spend(Side::Away, 5));
        let mut ai = controller(&catalog);

        assert!(ai.poll(3_000, &catalog, &economy, &field, &mut seeded(3)).is_none());
        assert_eq!(ai.last_action_ms(), 3_000);
    }

    #[test]
    fn test_only_affordable_cards() {
        let (catalog, mut economy, field) = setup();
        // Leave 3 elixir: giant (5) and fireball (4) are out.
        assert!(economy.spend(Side::Away, 2));
        let mut rng = seeded(11);

        for _ in 0..100 {
            let decision = choose(
                Side::Away,
                catalog.ai_pool(),
                &catalog,
                &economy,
                &field,
                &mut rng,
            )
            .unwrap();
            assert_eq!(catalog.card(&decision.card_id).unwrap().cost(), 3);
        }
    }

    #[test]
    fn test_positions_stay_in_own_band() {
        let (catalog, _, _) = setup();
        let layout = catalog.layout();
        let mut rng = seeded(5);

        for _ in 0..200 {
            let p = random_point(Side::Away, layout, &mut rng);
            assert!(p.x >= Fixed::ZERO && p.x < layout.width);
            assert!(p.y >= layout.ai_deploy_min_y && p.y < layout.river_y);
            assert!(layout.in_deploy_region(Side::Away, p));

            let q = random_point(Side::Home, layout, &mut rng);
            assert!(layout.in_deploy_region(Side::Home, q));
        }
    }

    #[test]
    fn test_spells_aim_at_opposing_units() {
        let (catalog, economy, mut field) = setup();
        let rules = MatchRules::default();
        let knight = catalog.card("knight").unwrap().unit().unwrap().clone();
        let target = Vec2Fixed::from_ints(120, 380);
        field.spawn_unit(UnitSpawn {
            card_id: knight.id.clone(),
            side: Side::Home,
            position: target,
            health: knight.health,
            stats: UnitStats::from_card(&knight, false, &rules),
            active_at_ms: 0,
        });

        let spells_only = vec!["fireball".to_string()];
        let decision = choose(
            Side::Away,
            &spells_only,
            &catalog,
            &economy,
            &field,
            &mut seeded(1),
        )
        .unwrap();
        assert_eq!(decision.position, target);
    }
}
