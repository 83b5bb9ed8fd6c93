//! Injectable randomness.
//!
//! The only random choices in a match are the AI's card and position picks
//! and the player's next-card draw. Both go through [`RandomSource`] so a
//! test can replace the generator with a scripted sequence.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::math::Fixed;

/// Generator used by matches unless another source is supplied.
pub type DefaultRng = Pcg32;

/// Source of the random choices a match makes.
pub trait RandomSource {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform value in `[0, 1)`.
    fn unit_fraction(&mut self) -> Fixed;
}

impl<R: RngCore> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on an empty range");
        self.random_range(0..len.max(1))
    }

    fn unit_fraction(&mut self) -> Fixed {
        // 32 random fraction bits, integer part zero.
        Fixed::from_bits(i64::from(self.next_u32()))
    }
}

/// Create the default generator from a seed.
#[must_use]
pub fn seeded(seed: u64) -> DefaultRng {
    Pcg32::seed_from_u64(seed)
}
