//! Move policies.

use crate::core::GameRng;
use crate::rules::LegalMove;
use crate::tokens::TokenStore;

/// Chooses which legal move a bot plays.
pub trait MovePolicy: Send {
    /// Pick one of `moves`. Returns `None` only when `moves` is empty.
    fn choose(&mut self, store: &TokenStore, moves: &[LegalMove]) -> Option<LegalMove>;

    /// Short name for logs and self-play reports.
    fn name(&self) -> &'static str;
}

/// Uniformly random choice from a seeded RNG.
#[derive(Clone, Debug)]
pub struct RandomBot {
    rng: GameRng,
}

impl RandomBot {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl MovePolicy for RandomBot {
    fn choose(&mut self, _store: &TokenStore, moves: &[LegalMove]) -> Option<LegalMove> {
        self.rng.choose(moves).copied()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
