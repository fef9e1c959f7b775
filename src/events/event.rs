//! Game event types.
//!
//! Events are fire-and-forget notifications for renderers, UIs, loggers and
//! tests. They describe what already happened; consumers never mutate
//! engine state in response except through the acknowledgement gate.

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::core::{PlayerId, TokenId};
use crate::turn::TurnPhase;

/// Why a player rolls again.
///
/// When several apply, the most significant is reported:
/// capture, then reaching home, then entering the board, then a six.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraTurnReason {
    RolledSix,
    EnteredBoard,
    Capture,
    ReachedHome,
}

/// A notification published by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    RollStarted {
        player: PlayerId,
    },
    RollResolved {
        player: PlayerId,
        value: u8,
    },
    MoveStarted {
        token: TokenId,
        from: Position,
        to: Position,
        player: PlayerId,
    },
    MoveCompleted {
        token: TokenId,
        from: Position,
        to: Position,
        player: PlayerId,
    },
    TokenEnteredBoard {
        token: TokenId,
        position: Position,
        player: PlayerId,
    },
    TokenCaptured {
        captured: TokenId,
        capturing: TokenId,
        position: Position,
    },
    TokenReachedHome {
        token: TokenId,
        player: PlayerId,
    },
    TurnChanged {
        player: PlayerId,
        previous_player: PlayerId,
    },
    ExtraTurn {
        player: PlayerId,
        reason: ExtraTurnReason,
    },
    /// The roll left the player without a legal move.
    NoMoves {
        player: PlayerId,
        value: u8,
    },
    /// Third six in a row; the turn ends.
    Bust {
        player: PlayerId,
    },
    PhaseChanged {
        phase: TurnPhase,
    },
    GameStarted {
        player_count: usize,
    },
    /// A player brought all four tokens home. `place` is 1-based.
    GameWon {
        player: PlayerId,
        place: usize,
    },
    /// No further turns will be played.
    GameOver {
        standings: Vec<PlayerId>,
    },
    GameReset,
}

impl GameEvent {
    /// Wire name of the event, e.g. `roll-resolved`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::RollStarted { .. } => "roll-started",
            GameEvent::RollResolved { .. } => "roll-resolved",
            GameEvent::MoveStarted { .. } => "move-started",
            GameEvent::MoveCompleted { .. } => "move-completed",
            GameEvent::TokenEnteredBoard { .. } => "token-entered-board",
            GameEvent::TokenCaptured { .. } => "token-captured",
            GameEvent::TokenReachedHome { .. } => "token-reached-home",
            GameEvent::TurnChanged { .. } => "turn-changed",
            GameEvent::ExtraTurn { .. } => "extra-turn",
            GameEvent::NoMoves { .. } => "no-moves",
            GameEvent::Bust { .. } => "bust",
            GameEvent::PhaseChanged { .. } => "phase-changed",
            GameEvent::GameStarted { .. } => "game-started",
            GameEvent::GameWon { .. } => "game-won",
            GameEvent::GameOver { .. } => "game-over",
            GameEvent::GameReset => "game-reset",
        }
    }

    /// The player the event concerns, if any.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::RollStarted { player }
            | GameEvent::RollResolved { player, .. }
            | GameEvent::MoveStarted { player, .. }
            | GameEvent::MoveCompleted { player, .. }
            | GameEvent::TokenEnteredBoard { player, .. }
            | GameEvent::TokenReachedHome { player, .. }
            | GameEvent::TurnChanged { player, .. }
            | GameEvent::ExtraTurn { player, .. }
            | GameEvent::NoMoves { player, .. }
            | GameEvent::Bust { player }
            | GameEvent::GameWon { player, .. } => Some(*player),
            GameEvent::TokenCaptured { capturing, .. } => Some(capturing.player),
            GameEvent::PhaseChanged { .. }
            | GameEvent::GameStarted { .. }
            | GameEvent::GameOver { .. }
            | GameEvent::GameReset => None,
        }
    }
}
