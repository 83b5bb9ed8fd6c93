//! Match loop.
//!
//! [`Match`] owns the battlefield, both elixir pools, the player's deck, the
//! computer opponent and the random source. Nothing else holds mutable match
//! state, and every change happens either inside [`Match::tick`] or at a tick
//! boundary through [`Match::deploy`].

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ai::AiController;
use crate::battlefield::{Battlefield, UnitSpawn};
use crate::components::{EntityId, Side, Spell, TargetRef, UnitStats};
use crate::config::Settings;
use crate::data::{Card, CardCatalog, MatchRules, UnitCard};
use crate::deck::DeckManager;
use crate::economy::EconomyTracker;
use crate::error::{DeployError, GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::rng::{seeded, DefaultRng, RandomSource};
use crate::snapshot::RenderSnapshot;
use crate::systems::{
    destroyed_towers, projectile_system, spell_system, tower_system, unit_system, DamageEvent,
    TickTime, TowerDestroyed,
};
use crate::victory::{evaluate, Crowns, EndReason, Outcome};

/// Side controlled by the local player.
pub const PLAYER_SIDE: Side = Side::Home;

/// Side controlled by the computer opponent.
pub const AI_SIDE: Side = Side::Away;

/// Where the match is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for `start`.
    #[default]
    Menu,
    /// Ticking.
    Playing,
    /// Finished; the result is frozen until the menu is shown again.
    Over,
}

/// Request to put a card on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployCommand {
    /// Card to play.
    pub card_id: String,
    /// Target point.
    pub position: Vec2Fixed,
    /// Deploying side.
    pub side: Side,
}

impl DeployCommand {
    /// Build a command from integer coordinates.
    #[must_use]
    pub fn new(card_id: impl Into<String>, x: i32, y: i32, side: Side) -> Self {
        Self {
            card_id: card_id.into(),
            position: Vec2Fixed::from_ints(x, y),
            side,
        }
    }
}

/// An accepted deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployed {
    /// Card played.
    pub card_id: String,
    /// Deploying side.
    pub side: Side,
    /// Handles of the units or spell created.
    pub spawned: Vec<EntityId>,
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Winner or draw.
    pub outcome: Outcome,
    /// Final crowns.
    pub crowns: Crowns,
    /// Why the match ended.
    pub reason: EndReason,
    /// Match time at the end.
    pub elapsed_ms: u64,
}

/// Events generated during a single tick.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Outcome of each queued deploy, in submission order.
    pub deploys: Vec<std::result::Result<Deployed, DeployError>>,
    /// Deploy made by the computer opponent.
    pub ai_deploy: Option<Deployed>,
    /// Damage from units, towers and spells.
    pub damage: Vec<DamageEvent>,
    /// Units defeated this tick. They are purged at the start of the next.
    pub defeated: Vec<EntityId>,
    /// Units removed from the battlefield this tick.
    pub purged: Vec<EntityId>,
    /// Towers destroyed this tick.
    pub towers_destroyed: Vec<TowerDestroyed>,
    /// Set on the tick the match ended.
    pub result: Option<MatchResult>,
}

/// A single battle between the player and the computer opponent.
///
/// # Tick order
///
/// 1. Purge units defeated last tick
/// 2. Apply queued deploy commands
/// 3. Advance the clock and regenerate elixir
/// 4. Units
/// 5. Towers
/// 6. Projectiles
/// 7. Spells
/// 8. Computer opponent
/// 9. Crowns and termination
#[derive(Debug, Clone)]
pub struct Match<R = DefaultRng> {
    catalog: CardCatalog,
    settings: Settings,
    rng: R,
    phase: MatchPhase,
    tick: u64,
    elapsed_ms: u64,
    /// Sub-millisecond remainder from game-speed scaling, as 32.32 bits.
    speed_carry: u64,
    field: Battlefield,
    economy: EconomyTracker,
    deck: DeckManager,
    ai: AiController,
    crowns: Crowns,
    result: Option<MatchResult>,
    pending: VecDeque<DeployCommand>,
}

impl Match<DefaultRng> {
    /// Create a match using the default generator.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the catalog deck is unusable.
    pub fn new(catalog: CardCatalog, settings: Settings, seed: u64) -> Result<Self> {
        Self::with_rng(catalog, settings, seeded(seed))
    }
}

impl<R: RandomSource> Match<R> {
    /// Create a match with an explicit random source. The match starts in
    /// the menu phase.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the catalog deck is unusable.
    pub fn with_rng(catalog: CardCatalog, settings: Settings, rng: R) -> Result<Self> {
        check_settings(&settings)?;
        let rules = *catalog.rules();
        let deck = DeckManager::new(catalog.deck())?;
        let ai = AiController::new(
            AI_SIDE,
            catalog.ai_pool().to_vec(),
            settings.action_interval_ms(),
        );

        Ok(Self {
            field: Battlefield::with_towers(catalog.layout(), catalog.towers(), &rules),
            economy: EconomyTracker::new(&rules),
            deck,
            ai,
            catalog,
            settings,
            rng,
            phase: MatchPhase::Menu,
            tick: 0,
            elapsed_ms: 0,
            speed_carry: 0,
            crowns: Crowns::default(),
            result: None,
            pending: VecDeque::new(),
        })
    }

    /// Reset the battlefield and begin playing.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if a match is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.phase == MatchPhase::Playing {
            return Err(GameError::InvalidState("match already running".to_string()));
        }

        let rules = *self.catalog.rules();
        self.field =
            Battlefield::with_towers(self.catalog.layout(), self.catalog.towers(), &rules);
        self.economy = EconomyTracker::new(&rules);
        self.deck = DeckManager::new(self.catalog.deck())?;
        self.ai.reset(0);
        self.ai.set_interval(self.settings.action_interval_ms());
        self.tick = 0;
        self.elapsed_ms = 0;
        self.speed_carry = 0;
        self.crowns = Crowns::default();
        self.result = None;
        self.pending.clear();
        self.phase = MatchPhase::Playing;

        tracing::info!(
            difficulty = ?self.settings.difficulty,
            game_speed = %self.settings.game_speed,
            "Match started"
        );
        Ok(())
    }

    /// Stop the match at a tick boundary.
    ///
    /// Returns the result, computed from current crowns if the match was
    /// still running. Returns `None` from the menu.
    pub fn end(&mut self) -> Option<MatchResult> {
        match self.phase {
            MatchPhase::Menu => None,
            MatchPhase::Over => self.result,
            MatchPhase::Playing => {
                self.crowns = evaluate(&self.field, self.remaining_ms()).crowns;
                Some(self.finish(EndReason::Stopped))
            }
        }
    }

    /// Leave the result screen.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] while a match is running.
    pub fn return_to_menu(&mut self) -> Result<()> {
        if self.phase == MatchPhase::Playing {
            return Err(GameError::InvalidState(
                "cannot leave a running match without ending it".to_string(),
            ));
        }
        self.phase = MatchPhase::Menu;
        Ok(())
    }

    /// Replace the settings. Takes effect from the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ValidationError`] and keeps the old settings if
    /// the new ones are out of range.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        check_settings(&settings)?;
        self.ai.set_interval(settings.action_interval_ms());
        tracing::debug!(
            difficulty = ?settings.difficulty,
            game_speed = %settings.game_speed,
            "Settings applied"
        );
        self.settings = settings;
        Ok(())
    }

    /// Queue a deploy for the start of the next tick.
    pub fn enqueue(&mut self, command: DeployCommand) {
        self.pending.push_back(command);
    }

    /// Deploy a card now.
    ///
    /// Home deploys must come from the player's hand and rotate it. Away
    /// deploys draw from no hand.
    ///
    /// # Errors
    ///
    /// Returns a [`DeployError`] and changes nothing if the match is not
    /// running, the card is unknown or not in hand, the position is not
    /// legal for the card, or the side cannot afford it.
    pub fn deploy(&mut self, command: DeployCommand) -> std::result::Result<Deployed, DeployError> {
        if self.phase != MatchPhase::Playing {
            return Err(DeployError::MatchNotRunning);
        }
        let DeployCommand {
            card_id,
            position,
            side,
        } = command;

        let card = self
            .catalog
            .card(&card_id)
            .cloned()
            .ok_or_else(|| DeployError::UnknownCard(card_id.clone()))?;

        if side == PLAYER_SIDE && !self.deck.in_hand(&card_id) {
            return Err(DeployError::NotInHand(card_id));
        }

        let layout = self.catalog.layout();
        let legal = if card.is_spell() {
            layout.contains(position)
        } else {
            layout.in_deploy_region(side, position)
        };
        if !legal {
            return Err(DeployError::OutOfBounds {
                side,
                x: position.x,
                y: position.y,
            });
        }

        if !self.economy.spend(side, card.cost()) {
            return Err(DeployError::InsufficientElixir {
                side,
                required: card.cost(),
                available: self.economy.whole(side),
            });
        }

        let spawned = match &card {
            Card::Troop(unit) => self.spawn_units(unit, false, side, position),
            Card::Building(unit) => self.spawn_units(unit, true, side, position),
            Card::Spell(spell) => {
                let rules = self.catalog.rules();
                let id = self.field.spawn_spell(Spell {
                    id: 0,
                    card_id: spell.id.clone(),
                    side,
                    position,
                    cast_at_ms: self.elapsed_ms,
                    armed: false,
                    damage: spell.damage,
                    radius: rules.tiles(spell.radius),
                    arming_ms: rules.spell_arming_ms,
                    lifetime_ms: rules.spell_lifetime_ms,
                });
                vec![id]
            }
        };

        if side == PLAYER_SIDE {
            let rotated = self.deck.play(&card_id, &mut self.rng);
            debug_assert!(rotated, "hand changed between check and play");
        }

        tracing::debug!(
            card = %card_id,
            ?side,
            units = spawned.len(),
            elapsed_ms = self.elapsed_ms,
            "Deployed"
        );

        Ok(Deployed {
            card_id,
            side,
            spawned,
        })
    }

    fn spawn_units(
        &mut self,
        unit: &UnitCard,
        is_building: bool,
        side: Side,
        center: Vec2Fixed,
    ) -> Vec<EntityId> {
        let rules: MatchRules = *self.catalog.rules();
        let width = self.catalog.layout().width;
        let stats = UnitStats::from_card(unit, is_building, &rules);
        let count = unit.unit_count.max(1);
        let offset = rules.unit_spread * Fixed::from_num(count - 1) / Fixed::from_num(2);
        let base_x = center.x - offset;

        (0..count)
            .map(|i| {
                let x = (base_x + rules.unit_spread * Fixed::from_num(i)).clamp(Fixed::ZERO, width);
                self.field.spawn_unit(UnitSpawn {
                    card_id: unit.id.clone(),
                    side,
                    position: Vec2Fixed::new(x, center.y),
                    health: unit.health,
                    stats,
                    active_at_ms: self.elapsed_ms.saturating_add(unit.deploy_delay_ms),
                })
            })
            .collect()
    }

    /// Advance the match by `real_delta_ms` of wall-clock time, scaled by
    /// the game speed.
    ///
    /// Does nothing outside the playing phase.
    pub fn tick(&mut self, real_delta_ms: u64) -> TickEvents {
        let mut events = TickEvents::default();
        if self.phase != MatchPhase::Playing {
            return events;
        }

        events.purged = self.field.purge_defeated();

        while let Some(command) = self.pending.pop_front() {
            let outcome = self.deploy(command);
            if let Err(err) = &outcome {
                tracing::debug!(%err, "Queued deploy rejected");
            }
            events.deploys.push(outcome);
        }

        let delta_ms = self.scale_delta(real_delta_ms);
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        let time = TickTime {
            now_ms: self.elapsed_ms,
            delta_ms,
        };
        let rules = *self.catalog.rules();

        // 1. Economy
        self.economy.accrue(delta_ms);

        // 2. Units
        events.damage = unit_system(&mut self.field, time, &rules);

        // 3. Towers
        events.damage.extend(tower_system(&mut self.field, time, &rules));

        // 4. Projectiles
        projectile_system(&mut self.field);

        // 5. Spells
        events.damage.extend(spell_system(&mut self.field, time));

        events.defeated = events
            .damage
            .iter()
            .filter(|e| e.killed)
            .filter_map(|e| match e.target {
                TargetRef::Unit(id) => Some(id),
                TargetRef::Tower(_) => None,
            })
            .collect();
        events.towers_destroyed = destroyed_towers(&self.field, &events.damage);
        for tower in &events.towers_destroyed {
            tracing::debug!(side = ?tower.side, kind = tower.kind.as_str(), "Tower destroyed");
        }

        // 6. Computer opponent
        if let Some(decision) = self.ai.poll(
            self.elapsed_ms,
            &self.catalog,
            &self.economy,
            &self.field,
            &mut self.rng,
        ) {
            let command = DeployCommand {
                card_id: decision.card_id,
                position: decision.position,
                side: self.ai.side(),
            };
            match self.deploy(command) {
                Ok(deployed) => events.ai_deploy = Some(deployed),
                Err(err) => tracing::warn!(%err, "AI deploy rejected"),
            }
        }

        // 7. Crowns and termination
        let verdict = evaluate(&self.field, self.remaining_ms());
        self.crowns = verdict.crowns;
        if let Some(reason) = verdict.ended {
            events.result = Some(self.finish(reason));
        }

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Match state hash");
        }

        events
    }

    /// Convert wall-clock milliseconds to match milliseconds, carrying the
    /// fractional part to the next tick.
    fn scale_delta(&mut self, real_delta_ms: u64) -> u64 {
        let speed_bits = u128::try_from(self.settings.game_speed.to_bits()).unwrap_or(0);
        let total = u128::from(real_delta_ms) * speed_bits + u128::from(self.speed_carry);
        self.speed_carry = u64::try_from(total & u128::from(u32::MAX)).unwrap_or(0);
        u64::try_from(total >> 32).unwrap_or(u64::MAX)
    }

    fn finish(&mut self, reason: EndReason) -> MatchResult {
        let result = MatchResult {
            outcome: self.crowns.outcome(),
            crowns: self.crowns,
            reason,
            elapsed_ms: self.elapsed_ms,
        };
        self.result = Some(result);
        self.phase = MatchPhase::Over;
        self.pending.clear();

        tracing::info!(
            outcome = ?result.outcome,
            home_crowns = result.crowns.home,
            away_crowns = result.crowns.away,
            reason = ?reason,
            elapsed_ms = result.elapsed_ms,
            "Match over"
        );
        result
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Ticks processed since `start`.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Match time since `start`.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Match time left on the clock.
    #[must_use]
    pub fn remaining_ms(&self) -> u64 {
        self.catalog
            .rules()
            .battle_duration_ms
            .saturating_sub(self.elapsed_ms)
    }

    /// The battlefield.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    /// Mutable battlefield, for scenario setup and tooling.
    ///
    /// Changes made here bypass deploy rules and take effect on the next
    /// tick.
    pub fn battlefield_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    /// Both elixir pools.
    #[must_use]
    pub fn economy(&self) -> &EconomyTracker {
        &self.economy
    }

    /// The player's hand.
    #[must_use]
    pub fn deck(&self) -> &DeckManager {
        &self.deck
    }

    /// The computer opponent.
    #[must_use]
    pub fn ai(&self) -> &AiController {
        &self.ai
    }

    /// Current crowns.
    #[must_use]
    pub const fn crowns(&self) -> Crowns {
        self.crowns
    }

    /// Final result once the match is over.
    #[must_use]
    pub const fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Card table.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Deploys waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Build the render snapshot for the current state.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        let (units, towers, spells, projectiles) = RenderSnapshot::battlefield_views(&self.field);
        RenderSnapshot {
            tick: self.tick,
            elapsed_ms: self.elapsed_ms,
            remaining_ms: self.remaining_ms(),
            units,
            towers,
            spells,
            projectiles,
            home_elixir: self.economy.elixir(Side::Home).to_num(),
            away_elixir: self.economy.elixir(Side::Away).to_num(),
            hand: self.deck.hand().to_vec(),
            next_card: self.deck.next_card().to_string(),
            crowns: self.crowns,
            outcome: self.result.map(|r| r.outcome),
        }
    }

    /// Hash of the gameplay state.
    ///
    /// Two matches fed the same seed, deltas and commands produce the same
    /// hash after every tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.elapsed_ms.hash(&mut hasher);
        self.phase.hash(&mut hasher);

        for side in [Side::Home, Side::Away] {
            self.economy.pool(side).stored_ms.hash(&mut hasher);
        }
        self.deck.hand().hash(&mut hasher);
        self.deck.next_card().hash(&mut hasher);
        self.ai.last_action_ms().hash(&mut hasher);

        self.field.entities().len().hash(&mut hasher);
        for unit in self.field.entities() {
            unit.id.hash(&mut hasher);
            unit.card_id.hash(&mut hasher);
            unit.side.hash(&mut hasher);
            unit.position.hash(&mut hasher);
            unit.health.current.hash(&mut hasher);
            unit.state.hash(&mut hasher);
            unit.target.hash(&mut hasher);
            unit.last_attack_ms.hash(&mut hasher);
        }

        for tower in self.field.towers() {
            tower.id.hash(&mut hasher);
            tower.health.current.hash(&mut hasher);
            tower.state.hash(&mut hasher);
            tower.target.hash(&mut hasher);
            tower.last_attack_ms.hash(&mut hasher);
        }

        for spell in self.field.spells() {
            spell.id.hash(&mut hasher);
            spell.position.hash(&mut hasher);
            spell.armed.hash(&mut hasher);
        }

        for projectile in self.field.projectiles() {
            projectile.id.hash(&mut hasher);
            projectile.progress.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }
}

fn check_settings(settings: &Settings) -> Result<()> {
    let errors = settings.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GameError::ValidationError {
            source_name: "settings".to_string(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitState;
    use crate::config::Difficulty;

    fn new_match() -> Match {
        let mut m = Match::new(CardCatalog::builtin().unwrap(), Settings::default(), 7).unwrap();
        m.start().unwrap();
        m
    }

    #[test]
    fn test_new_match_waits_in_menu() {
        let mut m = Match::new(CardCatalog::builtin().unwrap(), Settings::default(), 7).unwrap();
        assert_eq!(m.phase(), MatchPhase::Menu);
        let events = m.tick(16);
        assert!(events.damage.is_empty());
        assert_eq!(m.tick_count(), 0);
        assert_eq!(
            m.deploy(DeployCommand::new("knight", 100, 400, Side::Home)),
            Err(DeployError::MatchNotRunning)
        );
    }

    #[test]
    fn test_deploy_spends_and_spawns() {
        let mut m = new_match();
        let deployed = m
            .deploy(DeployCommand::new("knight", 100, 400, Side::Home))
            .unwrap();

        assert_eq!(deployed.spawned.len(), 1);
        assert_eq!(m.economy().elixir(Side::Home), Fixed::from_num(2));
        let unit = m.battlefield().entity(deployed.spawned[0]).unwrap();
        assert_eq!(unit.health.current, 1450);
        assert_eq!(unit.health.max, 1450);
        assert!(!m.deck().in_hand("knight"));
        assert!(m.deck().in_hand("minions"));
    }

    #[test]
    fn test_multi_unit_spread() {
        let mut m = new_match();
        let deployed = m
            .deploy(DeployCommand::new("archer", 100, 400, Side::Home))
            .unwrap();
        let xs: Vec<Fixed> = deployed
            .spawned
            .iter()
            .map(|id| m.battlefield().entity(*id).unwrap().position.x)
            .collect();
        assert_eq!(xs, vec![Fixed::from_num(90), Fixed::from_num(110)]);
    }

    #[test]
    fn test_rejections_change_nothing() {
        let mut m = new_match();
        let before = m.state_hash();

        assert_eq!(
            m.deploy(DeployCommand::new("dragon", 100, 400, Side::Home)),
            Err(DeployError::UnknownCard("dragon".to_string()))
        );
        assert_eq!(
            m.deploy(DeployCommand::new("minions", 100, 400, Side::Home)),
            Err(DeployError::NotInHand("minions".to_string()))
        );
        assert!(matches!(
            m.deploy(DeployCommand::new("knight", 100, 100, Side::Home)),
            Err(DeployError::OutOfBounds { .. })
        ));
        assert!(matches!(
            m.deploy(DeployCommand::new("giant", 100, 400, Side::Home)),
            Ok(_)
        ));
        let after_giant = m.state_hash();
        assert_ne!(before, after_giant);
        assert_eq!(
            m.deploy(DeployCommand::new("archer", 100, 400, Side::Home)),
            Err(DeployError::InsufficientElixir {
                side: Side::Home,
                required: 3,
                available: 0
            })
        );
        assert_eq!(m.state_hash(), after_giant);
    }

    #[test]
    fn test_spell_may_land_in_enemy_half() {
        let mut m = new_match();
        assert!(m
            .deploy(DeployCommand::new("fireball", 187, 100, Side::Home))
            .is_ok());
        assert_eq!(m.battlefield().spells().len(), 1);
    }

    #[test]
    fn test_queued_deploys_apply_on_next_tick() {
        let mut m = new_match();
        m.enqueue(DeployCommand::new("knight", 100, 400, Side::Home));
        m.enqueue(DeployCommand::new("knight", 100, 400, Side::Home));
        assert!(m.battlefield().entities().is_empty());

        let events = m.tick(16);
        assert_eq!(events.deploys.len(), 2);
        assert!(events.deploys[0].is_ok());
        assert_eq!(
            events.deploys[1],
            Err(DeployError::NotInHand("knight".to_string()))
        );
        assert_eq!(m.pending(), 0);
    }

    #[test]
    fn test_game_speed_scales_clock() {
        let mut m = new_match();
        let settings = Settings {
            game_speed: Fixed::from_num(0.5),
            ..Settings::default()
        };
        m.apply_settings(settings).unwrap();

        m.tick(15);
        assert_eq!(m.elapsed_ms(), 7);
        m.tick(15);
        // Half milliseconds carry over.
        assert_eq!(m.elapsed_ms(), 15);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut m = new_match();
        let settings = Settings {
            game_speed: Fixed::from_num(5),
            ..Settings::default()
        };
        assert!(m.apply_settings(settings).is_err());
        assert_eq!(m.settings().game_speed, Fixed::ONE);
    }

    #[test]
    fn test_difficulty_change_updates_ai() {
        let mut m = new_match();
        m.apply_settings(Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(m.ai().interval_ms(), 2_000);
    }

    #[test]
    fn test_defeated_units_purged_next_tick() {
        let mut m = new_match();
        let deployed = m
            .deploy(DeployCommand::new("knight", 187, 240, Side::Home))
            .unwrap();
        let id = deployed.spawned[0];
        m.field.apply_damage(TargetRef::Unit(id), 5_000);
        assert_eq!(m.battlefield().entity(id).unwrap().state, UnitState::Defeated);
        assert_eq!(m.snapshot().units[0].state, UnitState::Defeated);

        let events = m.tick(16);
        assert_eq!(events.purged, vec![id]);
        assert!(m.battlefield().entity(id).is_none());
    }

    #[test]
    fn test_hours_long_frame_ends_on_time() {
        let mut m = new_match();
        m.apply_settings(Settings {
            game_speed: Fixed::from_num(2),
            ..Settings::default()
        })
        .unwrap();
        m.deploy(DeployCommand::new("knight", 187, 300, Side::Home))
            .unwrap();
        m.tick(16);

        let result = m.tick(40_000_000).result.unwrap();
        assert_eq!(result.reason, EndReason::TimeUp);
        assert_eq!(m.remaining_ms(), 0);
        assert_eq!(m.phase(), MatchPhase::Over);
    }

    #[test]
    fn test_saturating_frame_does_not_panic() {
        let mut m = new_match();
        m.deploy(DeployCommand::new("knight", 187, 300, Side::Home))
            .unwrap();
        let result = m.tick(u64::MAX).result.unwrap();
        assert_eq!(result.reason, EndReason::TimeUp);
        assert_eq!(m.elapsed_ms(), u64::MAX);
    }

    #[test]
    fn test_end_and_menu_cycle() {
        let mut m = new_match();
        assert!(m.return_to_menu().is_err());

        let result = m.end().unwrap();
        assert_eq!(result.reason, EndReason::Stopped);
        assert_eq!(result.outcome, Outcome::Draw);
        assert_eq!(m.phase(), MatchPhase::Over);
        assert_eq!(m.end(), Some(result));

        m.return_to_menu().unwrap();
        assert_eq!(m.phase(), MatchPhase::Menu);
        assert_eq!(m.end(), None);

        m.start().unwrap();
        assert_eq!(m.elapsed_ms(), 0);
        assert_eq!(m.economy().elixir(Side::Home), Fixed::from_num(5));
    }

    #[test]
    fn test_snapshot_contents() {
        let m = new_match();
        let snapshot = m.snapshot();
        assert_eq!(snapshot.towers.len(), 6);
        assert_eq!(snapshot.hand.len(), 4);
        assert_eq!(snapshot.next_card, "minions");
        assert!((snapshot.home_elixir - 5.0).abs() < f32::EPSILON);
        assert_eq!(snapshot.remaining_ms, 180_000);
        assert!(snapshot
            .towers
            .iter()
            .all(|t| (t.health_percent - 100.0).abs() < f32::EPSILON));
    }
}
