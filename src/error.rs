//! Engine error taxonomy.
//!
//! Ordinary rule violations (wrong token, wrong phase, illegal move) are
//! rejected with no state change; callers treat them as no-ops. `Overshoot`
//! is different: it means validation and execution disagree and must never
//! be swallowed.

use crate::core::{PlayerId, TokenId};
use crate::turn::TurnPhase;

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown token {0}")]
    UnknownToken(TokenId),

    #[error("{0} is not seated in this game")]
    UnknownPlayer(PlayerId),

    #[error("token {token} cannot move {dice}")]
    IllegalMove { token: TokenId, dice: u8 },

    #[error("token {token} does not belong to {player}")]
    NotYourToken { token: TokenId, player: PlayerId },

    #[error("expected phase {expected:?}, turn is in {actual:?}")]
    WrongPhase { expected: TurnPhase, actual: TurnPhase },

    #[error("game is over")]
    GameOver,

    #[error("no game in progress")]
    NotStarted,

    #[error("internal consistency failure: {token} validated for {dice} but overshoots the finish")]
    Overshoot { token: TokenId, dice: u8 },

    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("sequence cancelled by reset")]
    Cancelled,
}

impl EngineError {
    /// True for errors caused by invalid caller input rather than engine faults.
    #[must_use]
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownToken(_)
                | EngineError::UnknownPlayer(_)
                | EngineError::IllegalMove { .. }
                | EngineError::NotYourToken { .. }
                | EngineError::WrongPhase { .. }
                | EngineError::GameOver
                | EngineError::NotStarted
        )
    }
}
