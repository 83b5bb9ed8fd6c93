//! Crown accounting and match termination.

use serde::{Deserialize, Serialize};

use crate::battlefield::Battlefield;
use crate::components::Side;

/// Towers per side at match start.
pub const TOWERS_PER_SIDE: u32 = 3;

/// Crowns earned by each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Crowns {
    /// Crowns taken by the home side.
    pub home: u32,
    /// Crowns taken by the away side.
    pub away: u32,
}

impl Crowns {
    /// Crowns for one side.
    #[must_use]
    pub const fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Result if the match ended with these crowns.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Home side took more crowns.
    HomeWin,
    /// Away side took more crowns.
    AwayWin,
    /// Equal crowns.
    Draw,
}

impl Outcome {
    /// Winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::HomeWin => Some(Side::Home),
            Self::AwayWin => Some(Side::Away),
            Self::Draw => None,
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The clock ran out.
    TimeUp,
    /// A side lost every tower.
    TowerWipe,
    /// Ended from outside the simulation.
    Stopped,
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Crowns from current tower survival.
    pub crowns: Crowns,
    /// Set when the match must end now.
    pub ended: Option<EndReason>,
}

/// Derive crowns from tower survival and decide whether the match is over.
///
/// A side's crowns are the opposing towers it has destroyed. Losing every
/// tower ends the match at once; otherwise it ends when no time remains.
#[must_use]
pub fn evaluate(field: &Battlefield, remaining_ms: u64) -> Verdict {
    let alive = |side| u32::try_from(field.alive_towers(side)).unwrap_or(u32::MAX);
    let home_alive = alive(Side::Home);
    let away_alive = alive(Side::Away);

    let crowns = Crowns {
        home: TOWERS_PER_SIDE.saturating_sub(away_alive),
        away: TOWERS_PER_SIDE.saturating_sub(home_alive),
    };

    let ended = if home_alive == 0 || away_alive == 0 {
        Some(EndReason::TowerWipe)
    } else if remaining_ms == 0 {
        Some(EndReason::TimeUp)
    } else {
        None
    };

    Verdict { crowns, ended }
}
