//! Weighted-scoring bot.
//!
//! Each legal move scores the sum of the bonuses it earns:
//!
//! | Factor | Default |
//! |---|---|
//! | Captures an opponent | 100 |
//! | Lands on a safe cell | 50 |
//! | Enters the home stretch | 45 |
//! | Reaches the finish | 80 |
//! | Leaves base | 35 |
//! | Leaves a threatened cell | 30 |
//! | Progress, scaled by distance travelled | up to 25 |
//! | None of the above | 10 |
//!
//! The highest score wins; ties go to the earliest move in the list.

use serde::{Deserialize, Serialize};

use super::policy::MovePolicy;
use crate::board::Position;
use crate::core::PlayerId;
use crate::rules::{self, LegalMove};
use crate::tokens::TokenStore;

/// Heuristic weights.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotWeights {
    pub capture: i32,
    pub safe_cell: i32,
    pub home_stretch: i32,
    pub finish: i32,
    pub exit_spawn: i32,
    pub escape_threat: i32,
    /// Maximum progress bonus, earned in full at the finish.
    pub progress: i32,
    /// Awarded only when no other factor applies.
    pub fallback: i32,
}

impl Default for BotWeights {
    fn default() -> Self {
        Self {
            capture: 100,
            safe_cell: 50,
            home_stretch: 45,
            finish: 80,
            exit_spawn: 35,
            escape_threat: 30,
            progress: 25,
            fallback: 10,
        }
    }
}

/// True if an opponent token on the main track sits 1-6 cells behind
/// `cell`. Safe cells are never threatened.
#[must_use]
pub fn is_threatened(store: &TokenStore, player: PlayerId, cell: u8) -> bool {
    let board = store.board();
    if board.is_safe_cell(cell) {
        return false;
    }
    store
        .tokens()
        .filter(|t| t.owner() != player)
        .filter_map(|t| t.position.track_cell())
        .any(|from| (1..=6).contains(&board.track_distance(from, cell)))
}

/// Bot that plays the best-scoring move.
#[derive(Clone, Debug, Default)]
pub struct HeuristicBot {
    weights: BotWeights,
}

impl HeuristicBot {
    #[must_use]
    pub fn new(weights: BotWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &BotWeights {
        &self.weights
    }

    /// Score one move against the current board.
    #[must_use]
    pub fn score(&self, store: &TokenStore, mv: &LegalMove) -> i32 {
        let w = &self.weights;
        let board = store.board();
        let player = mv.token.player;

        let mut bonus = 0;
        if rules::capture_target(store, player, mv.to).is_some() {
            bonus += w.capture;
        }
        if mv.to.track_cell().is_some_and(|cell| board.is_safe_cell(cell)) {
            bonus += w.safe_cell;
        }
        if mv.enters_home_stretch() {
            bonus += w.home_stretch;
        }
        if mv.reaches_finish() {
            bonus += w.finish;
        }
        if mv.exits_base() {
            bonus += w.exit_spawn;
        }
        if let Position::Track(cell) = mv.from {
            if is_threatened(store, player, cell) {
                bonus += w.escape_threat;
            }
        }
        if bonus == 0 {
            bonus = w.fallback;
        }

        let travelled = board.steps_for(player, mv.to).unwrap_or(0) as i32;
        bonus + w.progress * travelled / board.finish_steps() as i32
    }
}

impl MovePolicy for HeuristicBot {
    fn choose(&mut self, store: &TokenStore, moves: &[LegalMove]) -> Option<LegalMove> {
        let mut best: Option<(i32, LegalMove)> = None;
        for mv in moves {
            let score = self.score(store, mv);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, *mv));
            }
        }
        best.map(|(_, mv)| mv)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
