//! Deterministic random number generation for dice and bots.
//!
//! - **Deterministic**: same seed produces the same roll sequence
//! - **Serializable**: O(1) state capture and restore, so a restored game
//!   keeps rolling exactly where the saved one stopped
//!
//! ```
//! use ludo_engine::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! let rolls_a: Vec<u8> = (0..20).map(|_| a.roll_die()).collect();
//! let rolls_b: Vec<u8> = (0..20).map(|_| b.roll_die()).collect();
//! assert_eq!(rolls_a, rolls_b);
//! assert!(rolls_a.iter().all(|v| (1..=6).contains(v)));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Roll a six-sided die.
    pub fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for snapshots.
///
/// Uses the ChaCha8 word position so capture is O(1) regardless of how
/// many rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
