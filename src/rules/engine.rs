//! Move validation and execution.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::board::{Position, TokenState};
use crate::core::{PlayerId, TokenId, TOKENS_PER_PLAYER};
use crate::error::EngineError;
use crate::events::ExtraTurnReason;
use crate::tokens::TokenStore;

/// A move the current dice value allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalMove {
    pub token: TokenId,
    pub dice: u8,
    pub from: Position,
    pub to: Position,
}

impl LegalMove {
    #[must_use]
    pub fn exits_base(&self) -> bool {
        self.from == Position::Base
    }

    #[must_use]
    pub fn enters_home_stretch(&self) -> bool {
        matches!(self.from, Position::Track(_)) && matches!(self.to, Position::HomeStretch(_))
    }

    #[must_use]
    pub fn reaches_finish(&self) -> bool {
        self.to == Position::Finished
    }
}

/// Legal moves for one player; never more than four.
pub type MoveList = SmallVec<[LegalMove; 4]>;

/// What executing a move did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub token: TokenId,
    pub dice: u8,
    pub from: Position,
    pub to: Position,
    pub entered_board: bool,
    pub reached_home: bool,
    /// Opponent token on the landing cell. Still on the board: the caller
    /// applies `capture_reset` after presenting the capture.
    pub capture: Option<TokenId>,
    pub gets_extra_turn: bool,
}

impl MoveOutcome {
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.token.player
    }

    /// Most significant reason for the extra turn, if one was earned.
    #[must_use]
    pub fn extra_turn_reason(&self) -> Option<ExtraTurnReason> {
        if self.capture.is_some() {
            Some(ExtraTurnReason::Capture)
        } else if self.reached_home {
            Some(ExtraTurnReason::ReachedHome)
        } else if self.entered_board {
            Some(ExtraTurnReason::EnteredBoard)
        } else if self.dice == 6 {
            Some(ExtraTurnReason::RolledSix)
        } else {
            None
        }
    }
}

/// Where `token` would land with `dice`, if the move is legal.
#[must_use]
pub fn destination(store: &TokenStore, token: TokenId, dice: u8) -> Option<Position> {
    if !(1..=6).contains(&dice) {
        return None;
    }
    let record = store.get(token)?;
    let board = store.board();

    match record.state() {
        TokenState::Finished => None,
        TokenState::SpawnedAtBase => {
            (dice == 6).then(|| Position::Track(board.start_offset(token.player)))
        }
        TokenState::OnTrack | TokenState::InHomeStretch => {
            let remaining = board.finish_steps() - record.steps_from_start;
            if dice > remaining {
                return None;
            }
            board.locate(token.player, record.steps_from_start + dice)
        }
    }
}

/// Whether `token` may move `dice` steps.
#[must_use]
pub fn is_legal(store: &TokenStore, token: TokenId, dice: u8) -> bool {
    destination(store, token, dice).is_some()
}

/// Every legal move for `player`, in token index order.
#[must_use]
pub fn legal_moves(store: &TokenStore, player: PlayerId, dice: u8) -> MoveList {
    store
        .tokens_of(player)
        .filter_map(|t| {
            destination(store, t.id, dice).map(|to| LegalMove {
                token: t.id,
                dice,
                from: t.position,
                to,
            })
        })
        .collect()
}

/// The opponent token a `mover`'s token landing on `to` would capture.
///
/// Only main-track cells that are not safe can capture, and only when
/// exactly one opponent token stands there. Teammates share cells freely.
#[must_use]
pub fn capture_target(store: &TokenStore, mover: PlayerId, to: Position) -> Option<TokenId> {
    let cell = to.track_cell()?;
    if store.board().is_safe_cell(cell) {
        return None;
    }

    let occupants = store.tokens_at(cell);
    let mut opponents = occupants.iter().filter(|t| t.owner() != mover);
    match (opponents.next(), opponents.next()) {
        (Some(only), None) => Some(only.id),
        _ => None,
    }
}

/// Execute a move.
///
/// Rejects unknown tokens and illegal moves without touching the store.
/// Returns `Overshoot` if the store refuses a move that validated, which
/// means validation and execution disagree.
pub fn execute(store: &mut TokenStore, token: TokenId, dice: u8) -> Result<MoveOutcome, EngineError> {
    let record = *store.get(token).ok_or(EngineError::UnknownToken(token))?;
    if !is_legal(store, token, dice) {
        return Err(EngineError::IllegalMove { token, dice });
    }

    let (from, to, entered_board) = if record.state() == TokenState::SpawnedAtBase {
        if !store.enter_board(token) {
            return Err(EngineError::IllegalMove { token, dice });
        }
        let to = Position::Track(store.board().start_offset(token.player));
        (Position::Base, to, true)
    } else {
        let step = store
            .advance(token, dice)
            .ok_or(EngineError::Overshoot { token, dice })?;
        (step.from, step.to, false)
    };

    let reached_home = to == Position::Finished;
    let capture = capture_target(store, token.player, to);
    let gets_extra_turn = dice == 6 || entered_board || capture.is_some() || reached_home;

    debug!(
        %token, dice, %from, %to, entered_board, reached_home,
        capture = ?capture, gets_extra_turn, "move executed"
    );

    Ok(MoveOutcome {
        token,
        dice,
        from,
        to,
        entered_board,
        reached_home,
        capture,
        gets_extra_turn,
    })
}

/// True iff every token of `player` is finished.
#[must_use]
pub fn check_win(store: &TokenStore, player: PlayerId) -> bool {
    store.has_player_finished(player)
}

/// Share of the total distance `player`'s tokens have covered, 0-100.
///
/// For display and bot heuristics only.
#[must_use]
pub fn progress(store: &TokenStore, player: PlayerId) -> f64 {
    let finish = store.board().finish_steps() as f64;
    let covered: f64 = store
        .tokens_of(player)
        .map(|t| match t.position {
            Position::Base => 0.0,
            Position::Finished => finish,
            _ => t.steps_from_start as f64,
        })
        .sum();
    covered / (finish * TOKENS_PER_PLAYER as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::tokens::Placement;

    fn id(player: PlayerId, index: u8) -> TokenId {
        TokenId::new(player, index).unwrap()
    }

    fn four_player_store() -> TokenStore {
        let mut store = TokenStore::new(Board::standard());
        store.initialize(PlayerId::all());
        store
    }

    #[test]
    fn test_base_token_needs_six() {
        let store = four_player_store();
        let red0 = id(PlayerId::RED, 0);
        for dice in 1..=5 {
            assert!(!is_legal(&store, red0, dice));
        }
        assert!(is_legal(&store, red0, 6));
        assert!(!is_legal(&store, red0, 0));
        assert!(!is_legal(&store, red0, 7));
    }

    #[test]
    fn test_enter_board_on_six() {
        let mut store = four_player_store();
        let red0 = id(PlayerId::RED, 0);

        let outcome = execute(&mut store, red0, 6).unwrap();
        assert!(outcome.entered_board);
        assert_eq!(outcome.to, Position::Track(1));
        assert!(outcome.gets_extra_turn);
        assert_eq!(outcome.capture, None);
        assert_eq!(outcome.extra_turn_reason(), Some(ExtraTurnReason::EnteredBoard));
    }

    #[test]
    fn test_entering_never_captures_on_safe_start() {
        let mut store = four_player_store();
        // Green token parked on Red's start cell (Green steps 39 -> cell 1).
        store.place(id(PlayerId::GREEN, 0), Placement::Steps(39)).unwrap();
        assert_eq!(store.get(id(PlayerId::GREEN, 0)).unwrap().position, Position::Track(1));

        let outcome = execute(&mut store, id(PlayerId::RED, 0), 6).unwrap();
        assert_eq!(outcome.capture, None);
    }

    #[test]
    fn test_home_entry_into_home_stretch() {
        let mut store = four_player_store();
        let red0 = id(PlayerId::RED, 0);
        store.place(red0, Placement::Steps(50)).unwrap();
        assert_eq!(store.get(red0).unwrap().position, Position::Track(51));

        let outcome = execute(&mut store, red0, 2).unwrap();
        assert_eq!(outcome.to, Position::HomeStretch(1));
        assert!(!outcome.gets_extra_turn);
    }

    #[test]
    fn test_home_stretch_exact_finish() {
        let mut store = four_player_store();
        let red0 = id(PlayerId::RED, 0);
        store.place(red0, Placement::Steps(53)).unwrap(); // home cell 2

        assert!(!is_legal(&store, red0, 4));
        assert!(is_legal(&store, red0, 3));

        let outcome = execute(&mut store, red0, 3).unwrap();
        assert!(outcome.reached_home);
        assert_eq!(outcome.to, Position::Finished);
        assert_eq!(outcome.extra_turn_reason(), Some(ExtraTurnReason::ReachedHome));
    }

    #[test]
    fn test_finished_token_never_moves() {
        let mut store = four_player_store();
        let red0 = id(PlayerId::RED, 0);
        store.place(red0, Placement::Steps(56)).unwrap();
        assert!((1..=6).all(|d| !is_legal(&store, red0, d)));
    }

    #[test]
    fn test_capture_is_reported_not_applied() {
        let mut store = four_player_store();
        let yellow0 = id(PlayerId::YELLOW, 0);
        let red0 = id(PlayerId::RED, 0);
        // Yellow enters at 27; 41 steps wraps to cell 16, which is not safe.
        store.place(yellow0, Placement::Steps(41)).unwrap();
        assert_eq!(store.get(yellow0).unwrap().position, Position::Track(16));
        store.place(red0, Placement::Steps(12)).unwrap(); // cell 13

        let outcome = execute(&mut store, red0, 3).unwrap();
        assert_eq!(outcome.to, Position::Track(16));
        assert_eq!(outcome.capture, Some(yellow0));
        assert!(outcome.gets_extra_turn);
        assert_eq!(outcome.extra_turn_reason(), Some(ExtraTurnReason::Capture));

        // Yellow still stands on the cell until the caller resets it.
        assert_eq!(store.get(yellow0).unwrap().position, Position::Track(16));
        assert!(store.capture_reset(yellow0));
        assert_eq!(store.get(yellow0).unwrap().position, Position::Base);
    }

    #[test]
    fn test_no_capture_on_safe_cell() {
        let mut store = four_player_store();
        // Blue 21 steps from 40 -> cell 9 (star).
        store.place(id(PlayerId::BLUE, 0), Placement::Steps(21)).unwrap();
        store.place(id(PlayerId::RED, 0), Placement::Steps(5)).unwrap(); // cell 6

        let outcome = execute(&mut store, id(PlayerId::RED, 0), 3).unwrap();
        assert_eq!(outcome.to, Position::Track(9));
        assert_eq!(outcome.capture, None);
    }

    #[test]
    fn test_teammates_stack_without_capture() {
        let mut store = four_player_store();
        store.place(id(PlayerId::RED, 1), Placement::Steps(15)).unwrap();
        store.place(id(PlayerId::RED, 0), Placement::Steps(12)).unwrap();

        let outcome = execute(&mut store, id(PlayerId::RED, 0), 3).unwrap();
        assert_eq!(outcome.capture, None);
        assert_eq!(store.tokens_at(16).len(), 2);
    }

    #[test]
    fn test_two_opponents_on_cell_are_not_captured() {
        let mut store = four_player_store();
        store.place(id(PlayerId::YELLOW, 0), Placement::Steps(41)).unwrap();
        store.place(id(PlayerId::YELLOW, 1), Placement::Steps(41)).unwrap();
        store.place(id(PlayerId::RED, 0), Placement::Steps(12)).unwrap();

        let outcome = execute(&mut store, id(PlayerId::RED, 0), 3).unwrap();
        assert_eq!(outcome.capture, None);
    }

    #[test]
    fn test_home_stretch_cells_never_capture() {
        let store = four_player_store();
        assert_eq!(capture_target(&store, PlayerId::RED, Position::HomeStretch(1)), None);
        assert_eq!(capture_target(&store, PlayerId::RED, Position::Finished), None);
    }

    #[test]
    fn test_illegal_and_unknown_rejected_without_mutation() {
        let mut store = four_player_store();
        let red0 = id(PlayerId::RED, 0);
        assert_eq!(
            execute(&mut store, red0, 3),
            Err(EngineError::IllegalMove { token: red0, dice: 3 })
        );
        assert_eq!(store.get(red0).unwrap().position, Position::Base);

        let mut two_player = TokenStore::new(Board::standard());
        two_player.initialize([PlayerId::RED, PlayerId::YELLOW]);
        let green0 = id(PlayerId::GREEN, 0);
        assert_eq!(
            execute(&mut two_player, green0, 6),
            Err(EngineError::UnknownToken(green0))
        );
    }

    #[test]
    fn test_legal_moves_in_token_order() {
        let mut store = four_player_store();
        store.place(id(PlayerId::RED, 2), Placement::Steps(10)).unwrap();
        store.place(id(PlayerId::RED, 3), Placement::Steps(55)).unwrap();

        let moves = legal_moves(&store, PlayerId::RED, 6);
        let tokens: Vec<u8> = moves.iter().map(|m| m.token.index).collect();
        assert_eq!(tokens, vec![0, 1, 2]);
        assert!(moves[0].exits_base());

        let moves = legal_moves(&store, PlayerId::RED, 1);
        let tokens: Vec<u8> = moves.iter().map(|m| m.token.index).collect();
        assert_eq!(tokens, vec![2, 3]);
        assert!(moves[1].reaches_finish());
    }

    #[test]
    fn test_check_win_and_progress() {
        let mut store = four_player_store();
        assert_eq!(progress(&store, PlayerId::RED), 0.0);

        for i in 0..3 {
            store.place(id(PlayerId::RED, i), Placement::Steps(56)).unwrap();
        }
        assert!(!check_win(&store, PlayerId::RED));
        assert!((progress(&store, PlayerId::RED) - 75.0).abs() < 1e-9);

        store.place(id(PlayerId::RED, 3), Placement::Steps(28)).unwrap();
        assert!((progress(&store, PlayerId::RED) - 87.5).abs() < 1e-9);

        store.place(id(PlayerId::RED, 3), Placement::Steps(56)).unwrap();
        assert!(check_win(&store, PlayerId::RED));
        assert_eq!(progress(&store, PlayerId::RED), 100.0);
    }
}
