//! Serializable game snapshot for save/load collaborators.
//!
//! Carries the roster, every token record, the turn state, the winners so
//! far and the dice (including the RNG position, so a restored game rolls
//! the same sequence the saved one would have). JSON for humans and tools,
//! bincode for compact storage.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::board::Board;
use crate::core::{PlayerId, Roster, Timings, HOME_STRETCH_RANGE, TOKENS_PER_PLAYER};
use crate::dice::{Dice, DiceSnapshot};
use crate::error::EngineError;
use crate::events::{AckGate, EventBus};
use crate::rules;
use crate::tokens::{Token, TokenStore};
use crate::turn::{TurnOrchestrator, TurnPhase, TurnState};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub home_stretch_length: u8,
    pub roster: Roster,
    pub tokens: Vec<Token>,
    pub turn: TurnState,
    pub winners: Vec<PlayerId>,
    pub dice: DiceSnapshot,
}

impl GameSnapshot {
    /// Capture the orchestrator's current state.
    #[must_use]
    pub fn capture(turn: &TurnOrchestrator) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            home_stretch_length: turn.store().board().home_stretch_length(),
            roster: turn.roster().clone(),
            tokens: turn.store().tokens().copied().collect(),
            turn: turn.state().clone(),
            winners: turn.winners().to_vec(),
            dice: turn.dice().snapshot(),
        }
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    /// Structural checks that do not need a token store.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(invalid(format!("unsupported version {}", self.version)));
        }
        if !HOME_STRETCH_RANGE.contains(&self.home_stretch_length) {
            return Err(invalid(format!(
                "home stretch length {} out of range",
                self.home_stretch_length
            )));
        }
        self.roster
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        for token in &self.tokens {
            if !self.roster.contains(token.owner()) {
                return Err(invalid(format!("token {} belongs to no seat", token.id)));
            }
        }
        for player in self.roster.players() {
            let count = self.tokens.iter().filter(|t| t.owner() == player).count();
            if count != usize::from(TOKENS_PER_PLAYER) {
                return Err(invalid(format!("{player} has {count} tokens")));
            }
        }

        match self.roster.seat(self.turn.current) {
            Some(seat) if seat.player == self.turn.player => {}
            _ => {
                return Err(invalid(format!(
                    "turn index {} does not seat {}",
                    self.turn.current, self.turn.player
                )))
            }
        }

        for (i, winner) in self.winners.iter().enumerate() {
            if !self.roster.contains(*winner) || self.winners[..i].contains(winner) {
                return Err(invalid(format!("bad winner entry {winner}")));
            }
        }
        self.validate_standings()?;
        if self.dice.value.is_some_and(|v| !(1..=6).contains(&v)) {
            return Err(invalid("dice value outside 1-6".to_string()));
        }
        Ok(())
    }

    /// Winners, finished tokens and the game-over phase must agree.
    fn validate_standings(&self) -> Result<(), EngineError> {
        let seats = self.roster.len();
        let over = self.winners.len() + 1 >= seats;
        let finished = |player: PlayerId| {
            self.tokens
                .iter()
                .filter(|t| t.owner() == player)
                .all(Token::is_finished)
        };

        // With complete standings the last entry is the player left behind.
        let ranked = if self.winners.len() == seats {
            &self.winners[..seats - 1]
        } else {
            &self.winners[..]
        };
        if let Some(winner) = ranked.iter().find(|p| !finished(**p)) {
            return Err(invalid(format!("{winner} is ranked but has tokens left")));
        }
        if let Some(player) = self
            .roster
            .players()
            .find(|p| finished(*p) && !self.winners.contains(p))
        {
            return Err(invalid(format!("{player} finished but is not ranked")));
        }

        match (self.turn.phase == TurnPhase::GameOver, over) {
            (true, false) => Err(invalid(format!(
                "game over with {} of {seats} players ranked",
                self.winners.len()
            ))),
            (false, true) => Err(invalid("standings complete but game not over".to_string())),
            _ if over && self.winners.len() != seats => {
                Err(invalid("game over without the last place".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Rebuild an orchestrator.
    ///
    /// Rolls and moves in flight at capture time are not resumed: the
    /// current player rolls again. A pending selection is kept with its
    /// legal set recomputed from the restored tokens.
    pub(crate) fn into_orchestrator(
        self,
        events: EventBus,
        acks: AckGate,
        timings: Timings,
        cancel: CancellationToken,
    ) -> Result<TurnOrchestrator, EngineError> {
        self.validate()?;
        let board = Board::with_home_stretch_length(self.home_stretch_length);
        let store = TokenStore::from_tokens(board, self.tokens)?;
        let dice = Dice::from_snapshot(&self.dice);

        let mut state = self.turn;
        match state.phase {
            TurnPhase::WaitingForMove => {
                let value = state
                    .dice_value
                    .ok_or_else(|| invalid("waiting for a move without a dice value".to_string()))?;
                let moves = rules::legal_moves(&store, state.player, value);
                if moves.is_empty() {
                    state = TurnState::new(state.current, state.player);
                } else {
                    state.legal_moves = moves;
                    state.selected_token = None;
                }
            }
            TurnPhase::GameOver | TurnPhase::WaitingForRoll => {
                state.legal_moves.clear();
                state.selected_token = None;
            }
            TurnPhase::Rolling | TurnPhase::Moving | TurnPhase::Animating | TurnPhase::TurnEnding => {
                let can_roll_again = state.can_roll_again;
                state = TurnState::new(state.current, state.player);
                state.can_roll_again = can_roll_again;
            }
        }

        Ok(TurnOrchestrator::from_parts(
            self.roster,
            store,
            dice,
            state,
            self.winners,
            events,
            acks,
            timings,
            cancel,
        ))
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidSnapshot(message)
}
