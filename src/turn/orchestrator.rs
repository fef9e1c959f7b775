//! The turn state machine.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::phase::{TurnPhase, TurnState};
use crate::board::Board;
use crate::core::{EngineConfig, PlayerId, Roster, Timings, TokenId};
use crate::dice::Dice;
use crate::error::EngineError;
use crate::events::{AckGate, AckKind, EventBus, GameEvent};
use crate::rules::{self, MoveList, MoveOutcome};
use crate::tokens::{Placement, Token, TokenStore};

/// What a call to [`TurnOrchestrator::roll`] led to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RollResult {
    /// Third six in a row. The turn passed without a move.
    Bust { value: u8 },
    /// No token could move. On a six the same player rolls again,
    /// otherwise the turn passed.
    NoMoves { value: u8, rolls_again: bool },
    /// Exactly one token could move and was moved.
    AutoMoved(MoveOutcome),
    /// Several tokens can move; waiting for [`TurnOrchestrator::select`].
    AwaitingSelection { value: u8, moves: MoveList },
}

impl RollResult {
    /// The rolled value.
    #[must_use]
    pub fn value(&self) -> u8 {
        match self {
            RollResult::Bust { value }
            | RollResult::NoMoves { value, .. }
            | RollResult::AwaitingSelection { value, .. } => *value,
            RollResult::AutoMoved(outcome) => outcome.dice,
        }
    }
}

/// Sequences rolls, moves and turn changes for one game.
///
/// Owns the token store, the dice and the turn state. Every mutation goes
/// through `&mut self`, and the only suspension points are the bounded
/// acknowledgement waits, so state is never observed mid-transition.
#[derive(Debug)]
pub struct TurnOrchestrator {
    roster: Roster,
    store: TokenStore,
    dice: Dice,
    state: TurnState,
    /// Finishing order. Append-only for the life of the game.
    winners: Vec<PlayerId>,
    events: EventBus,
    acks: AckGate,
    timings: Timings,
    cancel: CancellationToken,
}

impl TurnOrchestrator {
    /// Set up a new game: every token at base, first seat to roll.
    pub fn new(
        roster: Roster,
        config: &EngineConfig,
        events: EventBus,
        acks: AckGate,
        cancel: CancellationToken,
    ) -> Result<Self, EngineError> {
        roster.validate()?;
        config.validate()?;

        let mut store = TokenStore::new(Board::with_home_stretch_length(config.home_stretch_length));
        store.initialize(roster.players());
        let first = roster.seat(0).map(|s| s.player).ok_or_else(|| {
            EngineError::InvalidRoster("roster has no seats".to_string())
        })?;

        Ok(Self {
            roster,
            store,
            dice: Dice::new(config.seed),
            state: TurnState::new(0, first),
            winners: Vec::new(),
            events,
            acks,
            timings: config.timings.clone(),
            cancel,
        })
    }

    /// Rebuild from restored parts. The caller has validated them.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        roster: Roster,
        store: TokenStore,
        dice: Dice,
        state: TurnState,
        winners: Vec<PlayerId>,
        events: EventBus,
        acks: AckGate,
        timings: Timings,
        cancel: CancellationToken,
    ) -> Self {
        let mut dice = dice;
        dice.set_can_roll(state.phase == TurnPhase::WaitingForRoll);
        Self {
            roster,
            store,
            dice,
            state,
            winners,
            events,
            acks,
            timings,
            cancel,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    #[must_use]
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    #[must_use]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.state.player
    }

    /// Moves offered for selection (empty outside `WaitingForMove`).
    #[must_use]
    pub fn legal_moves(&self) -> &MoveList {
        &self.state.legal_moves
    }

    /// Players who brought every token home, in finishing order.
    #[must_use]
    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.phase == TurnPhase::GameOver
    }

    /// Finishing order once the game is over, the winners so far otherwise.
    #[must_use]
    pub fn standings(&self) -> Vec<PlayerId> {
        self.winners.clone()
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // === Debug / admin ===

    /// Force the next roll. Values outside 1-6 are ignored.
    pub fn force_next_roll(&mut self, value: u8) -> bool {
        self.dice.force_next(value)
    }

    /// Put a token somewhere through the same mapping as play.
    ///
    /// Only allowed while the current player is to roll. Bringing a
    /// player's last token home records them as a winner, and if that
    /// player is the one to roll, the turn passes on.
    pub fn place_token(&mut self, id: TokenId, placement: Placement) -> Result<Token, EngineError> {
        self.expect_phase(TurnPhase::WaitingForRoll)?;
        let owner = id.player;
        if self.winners.contains(&owner) {
            return Err(EngineError::InvalidSnapshot(format!(
                "{owner} has already finished, {id} cannot be placed"
            )));
        }
        let token = self.store.place(id, placement)?;

        if rules::check_win(&self.store, owner) {
            self.record_winner(owner);
            if !self.is_over() && owner == self.state.player {
                self.set_phase(TurnPhase::TurnEnding);
                self.advance_player();
            }
        }
        Ok(token)
    }

    /// Stop taking turns. Rolls and selections fail with `GameOver` afterwards.
    pub fn halt(&mut self) {
        if !self.is_over() {
            info!(winners = ?self.winners, "orchestrator halted");
            self.set_phase(TurnPhase::GameOver);
            self.events.publish(GameEvent::GameOver {
                standings: self.standings(),
            });
        }
    }

    // === Turn flow ===

    /// Roll for the current player and resolve what the roll allows.
    ///
    /// A roll with exactly one legal move plays it straight away, including
    /// the animation waits; with several, the turn waits for
    /// [`select`](Self::select).
    pub async fn roll(&mut self) -> Result<RollResult, EngineError> {
        self.expect_phase(TurnPhase::WaitingForRoll)?;
        let player = self.state.player;
        let cancel = self.cancel.clone();

        self.set_phase(TurnPhase::Rolling);
        let roll = guard(
            &cancel,
            self.dice
                .roll(player, &self.events, &self.acks, self.timings.dice_ack()),
        )
        .await?;
        let value = roll.value;
        self.state.dice_value = Some(value);
        self.state.can_roll_again = false;

        if roll.is_bust() {
            debug!(%player, "third six in a row, turn forfeited");
            self.events.publish(GameEvent::Bust { player });
            self.advance_player();
            return Ok(RollResult::Bust { value });
        }

        let moves = rules::legal_moves(&self.store, player, value);
        match moves.len() {
            0 => {
                self.events.publish(GameEvent::NoMoves { player, value });
                if roll.is_six() {
                    debug!(%player, "no legal move on a six, rolling again");
                    self.state.can_roll_again = true;
                    self.set_phase(TurnPhase::WaitingForRoll);
                    return Ok(RollResult::NoMoves { value, rolls_again: true });
                }

                debug!(%player, value, "no legal move, passing turn");
                self.set_phase(TurnPhase::TurnEnding);
                let delay = self.timings.no_move_delay();
                if !delay.is_zero() {
                    guard(&cancel, tokio::time::sleep(delay)).await?;
                }
                self.advance_player();
                Ok(RollResult::NoMoves { value, rolls_again: false })
            }
            1 => {
                let token = moves[0].token;
                debug!(%player, %token, value, "single legal move, auto-playing");
                let outcome = self.play(token, value).await?;
                Ok(RollResult::AutoMoved(outcome))
            }
            _ => {
                self.state.legal_moves = moves.clone();
                self.set_phase(TurnPhase::WaitingForMove);
                Ok(RollResult::AwaitingSelection { value, moves })
            }
        }
    }

    /// Play one of the offered moves.
    ///
    /// Rejects tokens of other players and tokens outside the legal set
    /// without changing any state.
    pub async fn select(&mut self, token: TokenId) -> Result<MoveOutcome, EngineError> {
        self.expect_phase(TurnPhase::WaitingForMove)?;
        let player = self.state.player;
        if token.player != player {
            return Err(EngineError::NotYourToken { token, player });
        }
        let dice = self.state.dice_value.ok_or(EngineError::WrongPhase {
            expected: TurnPhase::WaitingForMove,
            actual: TurnPhase::WaitingForRoll,
        })?;
        if !self.state.legal_moves.iter().any(|m| m.token == token) {
            return Err(EngineError::IllegalMove { token, dice });
        }
        self.play(token, dice).await
    }

    async fn play(&mut self, token: TokenId, dice: u8) -> Result<MoveOutcome, EngineError> {
        let resume = self.state.phase;
        let cancel = self.cancel.clone();
        let player = token.player;

        self.state.selected_token = Some(token);
        self.set_phase(TurnPhase::Moving);
        let outcome = match rules::execute(&mut self.store, token, dice) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state.selected_token = None;
                if resume.is_transient() {
                    self.state.legal_moves.clear();
                    self.set_phase(TurnPhase::WaitingForRoll);
                } else {
                    self.set_phase(resume);
                }
                return Err(err);
            }
        };

        let pending = self.acks.arm(AckKind::MoveAnimation);
        self.events.publish(GameEvent::MoveStarted {
            token,
            from: outcome.from,
            to: outcome.to,
            player,
        });
        if outcome.entered_board {
            self.events.publish(GameEvent::TokenEnteredBoard {
                token,
                position: outcome.to,
                player,
            });
        }
        self.set_phase(TurnPhase::Animating);
        guard(&cancel, pending.wait(self.timings.move_ack())).await?;
        self.events.publish(GameEvent::MoveCompleted {
            token,
            from: outcome.from,
            to: outcome.to,
            player,
        });
        if outcome.reached_home {
            self.events.publish(GameEvent::TokenReachedHome { token, player });
        }

        if let Some(captured) = outcome.capture {
            let pending = self.acks.arm(AckKind::CaptureAnimation);
            self.events.publish(GameEvent::TokenCaptured {
                captured,
                capturing: token,
                position: outcome.to,
            });
            guard(&cancel, pending.wait(self.timings.capture_ack())).await?;
            self.store.capture_reset(captured);
            debug!(%captured, by = %token, "capture applied");
        }

        self.state.legal_moves.clear();
        self.state.selected_token = None;

        if rules::check_win(&self.store, player) && !self.winners.contains(&player) {
            self.record_winner(player);
            if self.is_over() {
                return Ok(outcome);
            }
        }

        match outcome.extra_turn_reason() {
            Some(reason) if !self.winners.contains(&player) => {
                debug!(%player, ?reason, "extra turn");
                self.state.can_roll_again = true;
                self.events.publish(GameEvent::ExtraTurn { player, reason });
                self.set_phase(TurnPhase::WaitingForRoll);
            }
            _ => {
                self.set_phase(TurnPhase::TurnEnding);
                self.advance_player();
            }
        }
        Ok(outcome)
    }

    fn record_winner(&mut self, player: PlayerId) {
        self.winners.push(player);
        let place = self.winners.len();
        info!(%player, place, "player finished");
        self.events.publish(GameEvent::GameWon { player, place });

        if self.winners.len() + 1 >= self.roster.len() {
            let last: Vec<PlayerId> = self
                .roster
                .players()
                .filter(|p| !self.winners.contains(p))
                .collect();
            self.winners.extend(last);
            info!(standings = ?self.winners, "game over");
            self.set_phase(TurnPhase::GameOver);
            self.events.publish(GameEvent::GameOver {
                standings: self.winners.clone(),
            });
        }
    }

    /// Pass the turn to the next seat that still has tokens to bring home.
    ///
    /// Cycles through the roster at most once.
    fn advance_player(&mut self) {
        let previous = self.state.player;
        let seats = self.roster.len();
        self.dice.reset_streak();

        let mut next = self.state.current;
        for _ in 0..seats {
            next = (next + 1) % seats;
            let candidate = self.roster.seat(next).map(|s| s.player);
            if candidate.is_some_and(|p| !rules::check_win(&self.store, p)) {
                break;
            }
        }

        let player = self.roster.seat(next).map_or(previous, |s| s.player);
        self.state = TurnState::new(next, player);
        self.dice.set_can_roll(true);
        debug!(%previous, %player, "turn passed");
        self.events.publish(GameEvent::PhaseChanged {
            phase: TurnPhase::WaitingForRoll,
        });
        self.events.publish(GameEvent::TurnChanged {
            player,
            previous_player: previous,
        });
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        if self.state.phase != phase {
            debug!(from = ?self.state.phase, to = ?phase, "phase changed");
            self.state.phase = phase;
            self.dice.set_can_roll(phase == TurnPhase::WaitingForRoll);
            self.events.publish(GameEvent::PhaseChanged { phase });
        }
    }

    fn expect_phase(&self, expected: TurnPhase) -> Result<(), EngineError> {
        match self.state.phase {
            TurnPhase::GameOver => Err(EngineError::GameOver),
            actual if actual == expected => Ok(()),
            actual => Err(EngineError::WrongPhase { expected, actual }),
        }
    }
}

/// Run `fut` unless the session is reset first.
async fn guard<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, EngineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EngineError::Cancelled),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::events::ExtraTurnReason;

    fn id(player: PlayerId, index: u8) -> TokenId {
        TokenId::new(player, index).unwrap()
    }

    fn orchestrator(players: usize) -> TurnOrchestrator {
        TurnOrchestrator::new(
            Roster::standard(players, 0).unwrap(),
            &EngineConfig::headless(7),
            EventBus::new(256),
            AckGate::new(),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_no_moves_without_six_passes_turn() {
        let mut turn = orchestrator(2);
        let mut events = turn.events().subscribe();
        turn.force_next_roll(4);

        let result = turn.roll().await.unwrap();
        assert_eq!(result, RollResult::NoMoves { value: 4, rolls_again: false });
        assert_eq!(turn.current_player(), PlayerId::YELLOW);
        assert_eq!(turn.phase(), TurnPhase::WaitingForRoll);

        let names: Vec<_> = events.drain().iter().map(|e| e.name()).collect();
        assert!(names.contains(&"no-moves"));
        assert_eq!(names.last(), Some(&"turn-changed"));
    }

    #[tokio::test]
    async fn test_six_from_base_offers_every_token() {
        let mut turn = orchestrator(2);
        turn.force_next_roll(6);

        let result = turn.roll().await.unwrap();
        let RollResult::AwaitingSelection { value, moves } = result else {
            panic!("expected a selection, got {result:?}");
        };
        assert_eq!(value, 6);
        assert_eq!(moves.len(), 4);
        assert_eq!(turn.phase(), TurnPhase::WaitingForMove);

        let outcome = turn.select(id(PlayerId::RED, 0)).await.unwrap();
        assert!(outcome.entered_board);
        assert_eq!(outcome.to, Position::Track(1));
        // Extra turn keeps red on roll.
        assert_eq!(turn.current_player(), PlayerId::RED);
        assert_eq!(turn.phase(), TurnPhase::WaitingForRoll);
        assert!(turn.state().can_roll_again);
        assert!(turn.dice().can_roll());
        assert!(turn.legal_moves().is_empty());
    }

    #[tokio::test]
    async fn test_single_legal_move_auto_plays() {
        let mut turn = orchestrator(2);
        turn.place_token(id(PlayerId::RED, 0), Placement::Steps(10)).unwrap();
        turn.force_next_roll(3);

        let result = turn.roll().await.unwrap();
        let RollResult::AutoMoved(outcome) = result else {
            panic!("expected an auto move, got {result:?}");
        };
        assert_eq!(outcome.to, Position::Track(14));
        assert!(!outcome.gets_extra_turn);
        assert_eq!(turn.current_player(), PlayerId::YELLOW);
    }

    #[tokio::test]
    async fn test_select_rejections_leave_state_alone() {
        let mut turn = orchestrator(2);
        assert!(matches!(
            turn.select(id(PlayerId::RED, 0)).await,
            Err(EngineError::WrongPhase { .. })
        ));

        turn.place_token(id(PlayerId::RED, 1), Placement::Steps(55)).unwrap();
        turn.force_next_roll(6);
        turn.roll().await.unwrap();
        let before = turn.state().clone();

        assert_eq!(
            turn.select(id(PlayerId::YELLOW, 0)).await,
            Err(EngineError::NotYourToken {
                token: id(PlayerId::YELLOW, 0),
                player: PlayerId::RED
            })
        );
        // Red-1 needs exactly 1 to finish.
        assert_eq!(
            turn.select(id(PlayerId::RED, 1)).await,
            Err(EngineError::IllegalMove {
                token: id(PlayerId::RED, 1),
                dice: 6
            })
        );
        assert_eq!(turn.state(), &before);
        assert!(matches!(turn.roll().await, Err(EngineError::WrongPhase { .. })));
    }

    #[tokio::test]
    async fn test_third_six_busts_without_rollback() {
        let mut turn = orchestrator(2);
        turn.place_token(id(PlayerId::RED, 0), Placement::Steps(10)).unwrap();

        for expected in [16, 22] {
            turn.force_next_roll(6);
            turn.roll().await.unwrap();
            turn.select(id(PlayerId::RED, 0)).await.unwrap();
            assert_eq!(turn.store().get(id(PlayerId::RED, 0)).unwrap().steps_from_start, expected);
            assert_eq!(turn.current_player(), PlayerId::RED);
        }

        turn.force_next_roll(6);
        assert_eq!(turn.roll().await.unwrap(), RollResult::Bust { value: 6 });
        assert_eq!(turn.current_player(), PlayerId::YELLOW);
        assert_eq!(turn.store().get(id(PlayerId::RED, 0)).unwrap().steps_from_start, 22);
        assert_eq!(turn.dice().consecutive_sixes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_waits_then_resets_captured_token() {
        let mut turn = TurnOrchestrator::new(
            Roster::standard(2, 0).unwrap(),
            &EngineConfig::default(),
            EventBus::new(256),
            AckGate::new(),
            CancellationToken::new(),
        )
        .unwrap();
        let mut events = turn.events().subscribe();
        turn.place_token(id(PlayerId::YELLOW, 0), Placement::Steps(41)).unwrap();
        turn.place_token(id(PlayerId::RED, 0), Placement::Steps(12)).unwrap();
        turn.force_next_roll(3);

        // Nobody acknowledges; every wait times out and play continues.
        let result = turn.roll().await.unwrap();
        let RollResult::AutoMoved(outcome) = result else {
            panic!("expected an auto move, got {result:?}");
        };
        assert_eq!(outcome.capture, Some(id(PlayerId::YELLOW, 0)));
        assert_eq!(turn.store().get(id(PlayerId::YELLOW, 0)).unwrap().position, Position::Base);
        assert_eq!(turn.current_player(), PlayerId::RED);

        let events = events.drain();
        assert!(events.contains(&GameEvent::ExtraTurn {
            player: PlayerId::RED,
            reason: ExtraTurnReason::Capture
        }));
        let completed = events.iter().position(|e| e.name() == "move-completed").unwrap();
        let captured = events.iter().position(|e| e.name() == "token-captured").unwrap();
        assert!(completed < captured);
    }

    #[tokio::test]
    async fn test_last_token_home_ends_two_player_game() {
        let mut turn = orchestrator(2);
        let mut events = turn.events().subscribe();
        for i in 0..3 {
            turn.place_token(id(PlayerId::RED, i), Placement::Steps(56)).unwrap();
        }
        turn.place_token(id(PlayerId::RED, 3), Placement::Steps(55)).unwrap();
        turn.force_next_roll(1);

        let result = turn.roll().await.unwrap();
        assert!(matches!(result, RollResult::AutoMoved(ref o) if o.reached_home));
        assert!(turn.is_over());
        assert_eq!(turn.winners(), &[PlayerId::RED, PlayerId::YELLOW]);
        assert_eq!(turn.roll().await, Err(EngineError::GameOver));

        let events = events.drain();
        assert!(events.contains(&GameEvent::GameWon {
            player: PlayerId::RED,
            place: 1
        }));
        assert!(events.contains(&GameEvent::GameOver {
            standings: vec![PlayerId::RED, PlayerId::YELLOW]
        }));
    }

    #[tokio::test]
    async fn test_finished_players_are_skipped() {
        let mut turn = orchestrator(3);
        for i in 0..4 {
            turn.place_token(id(PlayerId::GREEN, i), Placement::Steps(56)).unwrap();
        }
        assert_eq!(turn.winners(), &[PlayerId::GREEN]);
        turn.force_next_roll(2);
        turn.roll().await.unwrap();
        assert_eq!(turn.current_player(), PlayerId::YELLOW);
        assert_eq!(turn.state().current, 2);
    }

    #[tokio::test]
    async fn test_placing_last_token_home_records_winner() {
        let mut turn = orchestrator(3);
        let mut events = turn.events().subscribe();
        for i in 0..4 {
            turn.place_token(id(PlayerId::RED, i), Placement::Steps(56)).unwrap();
        }

        assert_eq!(turn.winners(), &[PlayerId::RED]);
        assert!(!turn.is_over());
        // Red was to roll, so the turn moved on.
        assert_eq!(turn.current_player(), PlayerId::GREEN);
        assert_eq!(turn.phase(), TurnPhase::WaitingForRoll);
        assert!(events.drain().contains(&GameEvent::GameWon {
            player: PlayerId::RED,
            place: 1
        }));
        assert!(turn.place_token(id(PlayerId::RED, 0), Placement::Base).is_err());
        assert!(turn.store().has_player_finished(PlayerId::RED));

        for i in 0..4 {
            turn.place_token(id(PlayerId::YELLOW, i), Placement::Steps(56)).unwrap();
        }
        assert!(turn.is_over());
        assert_eq!(turn.winners(), &[PlayerId::RED, PlayerId::YELLOW, PlayerId::GREEN]);
    }

    #[tokio::test]
    async fn test_failed_auto_move_returns_to_waiting_for_roll() {
        let mut turn = orchestrator(2);
        turn.place_token(id(PlayerId::RED, 0), Placement::Steps(10)).unwrap();
        turn.force_next_roll(3);
        turn.set_phase(TurnPhase::Rolling);

        // The token is not Red's, so execution fails after the phase moved on.
        assert!(turn.play(id(PlayerId::YELLOW, 0), 3).await.is_err());
        assert_eq!(turn.phase(), TurnPhase::WaitingForRoll);
        assert!(turn.legal_moves().is_empty());
        assert!(matches!(turn.roll().await, Ok(RollResult::AutoMoved(_))));
    }

    #[tokio::test]
    async fn test_cancelled_sequence_returns_cancelled() {
        let cancel = CancellationToken::new();
        let mut turn = TurnOrchestrator::new(
            Roster::standard(2, 0).unwrap(),
            &EngineConfig::default(),
            EventBus::new(16),
            AckGate::new(),
            cancel.clone(),
        )
        .unwrap();
        cancel.cancel();
        assert_eq!(turn.roll().await, Err(EngineError::Cancelled));
    }

    #[test]
    fn test_halt_blocks_further_play() {
        let mut turn = orchestrator(2);
        let mut events = turn.events().subscribe();
        turn.halt();
        assert_eq!(
            events.drain().last(),
            Some(&GameEvent::GameOver { standings: Vec::new() })
        );
        assert!(turn.is_over());
        assert_eq!(
            turn.place_token(id(PlayerId::RED, 0), Placement::Base),
            Err(EngineError::GameOver)
        );
    }
}
