//! Elixir economy.
//!
//! Each side has a pool that fills linearly with match time and is spent to
//! deploy cards. Pools are stored in elixir-milliseconds (one elixir equals
//! `elixir_rate_ms` of accrual), so regeneration is exact integer arithmetic
//! and never drifts.

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::data::MatchRules;
use crate::math::Fixed;

/// One side's elixir pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElixirPool {
    /// Stored elixir in elixir-milliseconds.
    pub stored_ms: u64,
    /// Ceiling in elixir-milliseconds.
    pub capacity_ms: u64,
}

impl ElixirPool {
    /// Create a pool holding `stored_ms`, clamped to `capacity_ms`.
    #[must_use]
    pub fn new(stored_ms: u64, capacity_ms: u64) -> Self {
        Self {
            stored_ms: stored_ms.min(capacity_ms),
            capacity_ms,
        }
    }

    /// Add accrued time, respecting the ceiling.
    ///
    /// Returns the amount actually added.
    pub fn deposit(&mut self, amount_ms: u64) -> u64 {
        let space = self.capacity_ms - self.stored_ms;
        let deposited = amount_ms.min(space);
        self.stored_ms += deposited;
        deposited
    }

    /// Remove `amount_ms` if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn withdraw(&mut self, amount_ms: u64) -> bool {
        if self.stored_ms >= amount_ms {
            self.stored_ms -= amount_ms;
            true
        } else {
            false
        }
    }

    /// Check if the pool is full.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.stored_ms >= self.capacity_ms
    }
}

/// Regenerates and spends elixir for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyTracker {
    pools: [ElixirPool; 2],
    rate_ms: u64,
}

impl EconomyTracker {
    /// Create a tracker with both pools at the starting amount.
    #[must_use]
    pub fn new(rules: &MatchRules) -> Self {
        let rate_ms = rules.elixir_rate_ms.max(1);
        let capacity = u64::from(rules.max_elixir) * rate_ms;
        let start = u64::from(rules.starting_elixir) * rate_ms;
        Self {
            pools: [ElixirPool::new(start, capacity); 2],
            rate_ms,
        }
    }

    /// Accrue `delta_ms` of match time on both sides.
    pub fn accrue(&mut self, delta_ms: u64) {
        for pool in &mut self.pools {
            pool.deposit(delta_ms);
            debug_assert!(pool.stored_ms <= pool.capacity_ms);
        }
    }

    /// Current elixir as a continuous value.
    #[must_use]
    pub fn elixir(&self, side: Side) -> Fixed {
        let pool = &self.pools[side.index()];
        Fixed::from_num(pool.stored_ms) / Fixed::from_num(self.rate_ms)
    }

    /// Whole elixir units available.
    #[must_use]
    pub fn whole(&self, side: Side) -> u32 {
        let units = self.pools[side.index()].stored_ms / self.rate_ms;
        u32::try_from(units).unwrap_or(u32::MAX)
    }

    /// Check if a side can afford a cost.
    #[must_use]
    pub fn can_afford(&self, side: Side, amount: u32) -> bool {
        self.pools[side.index()].stored_ms >= self.cost_ms(amount)
    }

    /// Spend elixir if available.
    ///
    /// Returns false and leaves the pool untouched if `amount` exceeds the
    /// current value.
    pub fn spend(&mut self, side: Side, amount: u32) -> bool {
        let cost = self.cost_ms(amount);
        self.pools[side.index()].withdraw(cost)
    }

    /// Read a side's raw pool.
    #[must_use]
    pub fn pool(&self, side: Side) -> &ElixirPool {
        &self.pools[side.index()]
    }

    fn cost_ms(&self, amount: u32) -> u64 {
        u64::from(amount).saturating_mul(self.rate_ms)
    }
}
