//! Token records and the store that owns them.
//!
//! Uses `im::OrdMap` so cloning the store for snapshots and bot look-ahead
//! is O(1), and iteration order is stable (player, then token index).

use im::OrdMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::board::{Board, Position, TokenState};
use crate::core::{PlayerId, TokenId, TOKENS_PER_PLAYER};
use crate::error::EngineError;

/// A single token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub position: Position,
    /// Steps travelled from the start cell. 0 at base and on the start cell.
    pub steps_from_start: u8,
}

impl Token {
    fn at_base(id: TokenId) -> Self {
        Self {
            id,
            position: Position::Base,
            steps_from_start: 0,
        }
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.id.player
    }

    #[must_use]
    pub fn state(&self) -> TokenState {
        self.position.state()
    }

    /// Spawn area slot; each token keeps its own slot (0-3).
    #[must_use]
    pub fn spawn_slot(&self) -> u8 {
        self.id.index
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position == Position::Finished
    }
}

/// Result of a successful advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub from: Position,
    pub to: Position,
}

/// Where to put a token through the admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Base,
    /// On the board, this many steps from the start cell.
    Steps(u8),
}

/// Store of all token records in a game.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    board: Board,
    tokens: OrdMap<TokenId, Token>,
}

impl TokenStore {
    /// Create an empty store for the given board.
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            tokens: OrdMap::new(),
        }
    }

    /// Create four base tokens per active player, replacing any existing records.
    pub fn initialize(&mut self, players: impl IntoIterator<Item = PlayerId>) {
        self.tokens = players
            .into_iter()
            .flat_map(TokenId::all_for)
            .map(|id| (id, Token::at_base(id)))
            .collect();
    }

    /// Rebuild a store from saved records, checking each one is consistent.
    pub fn from_tokens(
        board: Board,
        tokens: impl IntoIterator<Item = Token>,
    ) -> Result<Self, EngineError> {
        let mut map = OrdMap::new();
        for token in tokens {
            let consistent = match token.position {
                Position::Base => token.steps_from_start == 0,
                position => board.locate(token.owner(), token.steps_from_start) == Some(position),
            };
            if !consistent {
                return Err(EngineError::InvalidSnapshot(format!(
                    "token {} at {} disagrees with {} steps",
                    token.id, token.position, token.steps_from_start
                )));
            }
            if map.insert(token.id, token).is_some() {
                return Err(EngineError::InvalidSnapshot(format!(
                    "token {} appears twice",
                    token.id
                )));
            }
        }
        Ok(Self { board, tokens: map })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    /// All tokens in (player, index) order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    /// A player's tokens in index order.
    pub fn tokens_of(&self, player: PlayerId) -> impl Iterator<Item = &Token> {
        self.tokens.values().filter(move |t| t.owner() == player)
    }

    /// Tokens standing on a main track cell.
    #[must_use]
    pub fn tokens_at(&self, cell: u8) -> SmallVec<[&Token; 4]> {
        self.tokens
            .values()
            .filter(|t| t.position == Position::Track(cell))
            .collect()
    }

    /// Move a base token onto its owner's start cell.
    ///
    /// Returns false if the token is unknown or not at base.
    pub fn enter_board(&mut self, id: TokenId) -> bool {
        let start = self.board.start_offset(id.player);
        match self.tokens.get_mut(&id) {
            Some(token) if token.position == Position::Base => {
                token.position = Position::Track(start);
                token.steps_from_start = 0;
                debug!(token = %id, cell = start, "token entered board");
                true
            }
            _ => false,
        }
    }

    /// Advance an on-board token by `steps`.
    ///
    /// Returns `None` if the token is unknown, not on the board, or the move
    /// would pass the finish. Landing exactly on the finish marks the token
    /// finished.
    pub fn advance(&mut self, id: TokenId, steps: u8) -> Option<Step> {
        let board = self.board;
        let token = self.tokens.get_mut(&id)?;
        if !matches!(token.state(), TokenState::OnTrack | TokenState::InHomeStretch) {
            return None;
        }

        let target = token.steps_from_start.checked_add(steps)?;
        let to = board.locate(id.player, target)?;
        let from = token.position;

        token.position = to;
        token.steps_from_start = target;
        debug!(token = %id, %from, %to, steps, "token advanced");
        Some(Step { from, to })
    }

    /// Send an on-board token back to base.
    ///
    /// Returns false for unknown, base or finished tokens.
    pub fn capture_reset(&mut self, id: TokenId) -> bool {
        match self.tokens.get_mut(&id) {
            Some(token) if matches!(token.state(), TokenState::OnTrack | TokenState::InHomeStretch) => {
                *token = Token::at_base(id);
                debug!(token = %id, "token returned to base");
                true
            }
            _ => false,
        }
    }

    /// True iff the player is seated and all four tokens are finished.
    #[must_use]
    pub fn has_player_finished(&self, player: PlayerId) -> bool {
        let mut count = 0;
        for token in self.tokens_of(player) {
            if !token.is_finished() {
                return false;
            }
            count += 1;
        }
        count == TOKENS_PER_PLAYER
    }

    /// Admin/test placement.
    ///
    /// Goes through the same position mapping as play, so the steps and
    /// position of the placed token always agree.
    pub fn place(&mut self, id: TokenId, placement: Placement) -> Result<Token, EngineError> {
        let board = self.board;
        let token = self
            .tokens
            .get_mut(&id)
            .ok_or(EngineError::UnknownToken(id))?;

        *token = match placement {
            Placement::Base => Token::at_base(id),
            Placement::Steps(steps) => {
                let position = board.locate(id.player, steps).ok_or_else(|| {
                    EngineError::InvalidSnapshot(format!(
                        "{steps} steps is past the finish for {id}"
                    ))
                })?;
                Token {
                    id,
                    position,
                    steps_from_start: steps,
                }
            }
        };
        debug!(token = %id, position = %token.position, "token placed");
        Ok(*token)
    }
}
