//! Read-only view of a match for the rendering collaborator.
//!
//! Values are converted to `f32` here and nowhere else in the simulation.

use serde::{Deserialize, Serialize};

use crate::battlefield::Battlefield;
use crate::components::{Side, TowerState, UnitState};
use crate::data::TowerKind;
use crate::victory::{Crowns, Outcome};

/// A unit as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    /// Registry handle.
    pub id: u64,
    /// Source card.
    pub card_id: String,
    /// Owning side.
    pub side: Side,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Remaining health, 0 to 100.
    pub health_percent: f32,
    /// Lifecycle state.
    pub state: UnitState,
}

/// A tower as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerView {
    /// Registry handle.
    pub id: u64,
    /// Tower type.
    pub kind: TowerKind,
    /// Owning side.
    pub side: Side,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Remaining health, 0 to 100.
    pub health_percent: f32,
    /// Lifecycle state.
    pub state: TowerState,
}

/// A spell effect as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellView {
    /// Registry handle.
    pub id: u64,
    /// Source card.
    pub card_id: String,
    /// Casting side.
    pub side: Side,
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Radius in distance units.
    pub radius: f32,
    /// Whether the effect has fired.
    pub armed: bool,
}

/// A projectile as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Registry handle.
    pub id: u64,
    /// Current x.
    pub x: f32,
    /// Current y.
    pub y: f32,
    /// Travel progress, 0 to 1.
    pub progress: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Ticks processed so far.
    pub tick: u64,
    /// Elapsed match time.
    pub elapsed_ms: u64,
    /// Match time left.
    pub remaining_ms: u64,
    /// Units in creation order.
    pub units: Vec<UnitView>,
    /// Towers in creation order.
    pub towers: Vec<TowerView>,
    /// Active spells.
    pub spells: Vec<SpellView>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectileView>,
    /// Home elixir.
    pub home_elixir: f32,
    /// Away elixir.
    pub away_elixir: f32,
    /// Player hand.
    pub hand: Vec<String>,
    /// Player next card.
    pub next_card: String,
    /// Crown counts.
    pub crowns: Crowns,
    /// Final result once the match is over.
    pub outcome: Option<Outcome>,
}

impl RenderSnapshot {
    pub(crate) fn battlefield_views(
        field: &Battlefield,
    ) -> (Vec<UnitView>, Vec<TowerView>, Vec<SpellView>, Vec<ProjectileView>) {
        let units = field
            .entities()
            .iter()
            .map(|e| {
                let (x, y) = e.position.to_f32();
                UnitView {
                    id: e.id,
                    card_id: e.card_id.clone(),
                    side: e.side,
                    x,
                    y,
                    health_percent: e.health.percent().to_num(),
                    state: e.state,
                }
            })
            .collect();

        let towers = field
            .towers()
            .iter()
            .map(|t| {
                let (x, y) = t.position.to_f32();
                TowerView {
                    id: t.id,
                    kind: t.kind,
                    side: t.side,
                    x,
                    y,
                    health_percent: t.health.percent().to_num(),
                    state: t.state,
                }
            })
            .collect();

        let spells = field
            .spells()
            .iter()
            .map(|s| {
                let (x, y) = s.position.to_f32();
                SpellView {
                    id: s.id,
                    card_id: s.card_id.clone(),
                    side: s.side,
                    x,
                    y,
                    radius: s.radius.to_num(),
                    armed: s.armed,
                }
            })
            .collect();

        let projectiles = field
            .projectiles()
            .iter()
            .map(|p| {
                let (x, y) = p.position().to_f32();
                ProjectileView {
                    id: p.id,
                    x,
                    y,
                    progress: p.progress.to_num(),
                }
            })
            .collect();

        (units, towers, spells, projectiles)
    }
}
