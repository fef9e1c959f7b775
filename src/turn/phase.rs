//! Turn phase and turn state.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, TokenId};
use crate::rules::MoveList;

/// Where the current turn is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnPhase {
    WaitingForRoll,
    Rolling,
    WaitingForMove,
    Moving,
    Animating,
    TurnEnding,
    /// The orchestrator has stopped; no further turns.
    GameOver,
}

impl TurnPhase {
    /// Phases only observable while a roll or move is in flight.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            TurnPhase::Rolling | TurnPhase::Moving | TurnPhase::Animating | TurnPhase::TurnEnding
        )
    }

    /// Phases in which the current player has to act.
    #[must_use]
    pub fn awaits_input(self) -> bool {
        matches!(self, TurnPhase::WaitingForRoll | TurnPhase::WaitingForMove)
    }
}

/// Turn state owned by the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Index into the roster's turn order.
    pub current: usize,
    /// Player at `current`.
    pub player: PlayerId,
    pub phase: TurnPhase,
    /// Value of the roll being played, if any.
    pub dice_value: Option<u8>,
    /// Set after an extra turn was granted; cleared when the turn passes.
    pub can_roll_again: bool,
    pub selected_token: Option<TokenId>,
    /// Legal set offered for selection in `WaitingForMove`.
    pub legal_moves: MoveList,
}

impl TurnState {
    /// Fresh state: `player` (at turn index `current`) is to roll.
    #[must_use]
    pub fn new(current: usize, player: PlayerId) -> Self {
        Self {
            current,
            player,
            phase: TurnPhase::WaitingForRoll,
            dice_value: None,
            can_roll_again: false,
            selected_token: None,
            legal_moves: MoveList::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_for_roll() {
        let state = TurnState::new(1, PlayerId::YELLOW);
        assert_eq!(state.phase, TurnPhase::WaitingForRoll);
        assert_eq!(state.player, PlayerId::YELLOW);
        assert!(state.legal_moves.is_empty());
        assert!(!state.can_roll_again);
    }

    #[test]
    fn test_phase_classification() {
        assert!(TurnPhase::Rolling.is_transient());
        assert!(TurnPhase::Animating.is_transient());
        assert!(!TurnPhase::WaitingForMove.is_transient());
        assert!(!TurnPhase::GameOver.is_transient());
        assert!(TurnPhase::WaitingForMove.awaits_input());
        assert!(!TurnPhase::GameOver.awaits_input());
    }

    #[test]
    fn test_phase_wire_names() {
        let json = serde_json::to_string(&TurnPhase::WaitingForMove).unwrap();
        assert_eq!(json, "\"waiting-for-move\"");
    }
}
