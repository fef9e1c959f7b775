//! Game session lifecycle.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::snapshot::GameSnapshot;
use crate::bot::{BotDriver, BotTurn, HeuristicBot, MovePolicy};
use crate::core::{EngineConfig, PlayerId, PlayerMap, Roster, TokenId};
use crate::error::EngineError;
use crate::events::{AckGate, EventBus, GameEvent, Subscription};
use crate::rules::MoveOutcome;
use crate::tokens::{Placement, Token};
use crate::turn::{RollResult, TurnOrchestrator, TurnPhase};

/// Cancels whatever roll or move the session is running.
///
/// Cloneable and usable from another task while the session is busy. The
/// interrupted call returns [`EngineError::Cancelled`]; call
/// [`GameSession::reset`] afterwards to clear the game.
#[derive(Clone, Debug)]
pub struct ResetHandle(CancellationToken);

impl ResetHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Result of [`GameSession::autoplay`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Finishing order; complete only if `completed`.
    pub standings: Vec<PlayerId>,
    pub rolls: usize,
    pub completed: bool,
}

/// One game instance: configuration, notification channel, acknowledgement
/// gate, turn orchestrator and per-seat bot policies.
///
/// Sessions share nothing, so any number can run side by side.
pub struct GameSession {
    config: EngineConfig,
    events: EventBus,
    acks: AckGate,
    cancel: CancellationToken,
    turn: Option<TurnOrchestrator>,
    policies: PlayerMap<Option<Box<dyn MovePolicy>>>,
    driver: BotDriver,
    rolls: usize,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("turn", &self.turn)
            .field("rolls", &self.rolls)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            events: EventBus::new(config.event_capacity),
            acks: AckGate::new(),
            cancel: CancellationToken::new(),
            turn: None,
            policies: PlayerMap::default(),
            driver: BotDriver::new(&config.timings),
            rolls: 0,
            config,
        })
    }

    // === Wiring for presentation layers ===

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Handle renderers use to acknowledge animations.
    #[must_use]
    pub fn acks(&self) -> AckGate {
        self.acks.clone()
    }

    /// Handle that interrupts the game currently in progress.
    #[must_use]
    pub fn reset_handle(&self) -> ResetHandle {
        ResetHandle(self.cancel.clone())
    }

    // === Lifecycle ===

    /// Start a new game, replacing any game in progress.
    ///
    /// Bot seats get a [`HeuristicBot`] with the configured weights.
    pub fn start(&mut self, roster: Roster) -> Result<(), EngineError> {
        roster.validate()?;
        self.teardown();

        let turn = TurnOrchestrator::new(
            roster,
            &self.config,
            self.events.clone(),
            self.acks.clone(),
            self.cancel.clone(),
        )?;
        for seat in turn.roster().seats() {
            if seat.is_bot {
                self.policies[seat.player] =
                    Some(Box::new(HeuristicBot::new(self.config.bot.clone())));
            }
        }

        let player_count = turn.roster().len();
        info!(player_count, seed = self.config.seed, "game started");
        self.turn = Some(turn);
        self.events.publish(GameEvent::GameStarted { player_count });
        Ok(())
    }

    /// Tear down the game in progress. In-flight rolls and moves are
    /// cancelled and nothing of them is kept.
    pub fn reset(&mut self) {
        self.teardown();
        info!("game reset");
        self.events.publish(GameEvent::GameReset);
    }

    fn teardown(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.acks.clear();
        self.turn = None;
        self.policies = PlayerMap::default();
        self.rolls = 0;
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.turn.is_some()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.turn.as_ref().is_some_and(TurnOrchestrator::is_over)
    }

    /// The orchestrator of the game in progress.
    pub fn turn(&self) -> Result<&TurnOrchestrator, EngineError> {
        self.turn.as_ref().ok_or(EngineError::NotStarted)
    }

    fn turn_mut(&mut self) -> Result<&mut TurnOrchestrator, EngineError> {
        self.turn.as_mut().ok_or(EngineError::NotStarted)
    }

    pub fn phase(&self) -> Result<TurnPhase, EngineError> {
        Ok(self.turn()?.phase())
    }

    pub fn current_player(&self) -> Result<PlayerId, EngineError> {
        Ok(self.turn()?.current_player())
    }

    /// Rolls made since the game started.
    #[must_use]
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    // === Play ===

    pub async fn roll(&mut self) -> Result<RollResult, EngineError> {
        let result = self.turn_mut()?.roll().await?;
        self.rolls += 1;
        Ok(result)
    }

    pub async fn select(&mut self, token: TokenId) -> Result<MoveOutcome, EngineError> {
        self.turn_mut()?.select(token).await
    }

    /// Force the next roll. Values outside 1-6 are ignored.
    pub fn force_next_roll(&mut self, value: u8) -> Result<bool, EngineError> {
        Ok(self.turn_mut()?.force_next_roll(value))
    }

    /// Admin/test token placement.
    pub fn place_token(&mut self, id: TokenId, placement: Placement) -> Result<Token, EngineError> {
        self.turn_mut()?.place_token(id, placement)
    }

    /// Give a seat a bot policy, or take it away with `None`.
    pub fn set_policy(
        &mut self,
        player: PlayerId,
        policy: Option<Box<dyn MovePolicy>>,
    ) -> Result<(), EngineError> {
        if !self.turn()?.roster().contains(player) {
            return Err(EngineError::UnknownPlayer(player));
        }
        self.policies[player] = policy;
        Ok(())
    }

    #[must_use]
    pub fn has_policy(&self, player: PlayerId) -> bool {
        self.policies[player].is_some()
    }

    /// Let the current seat's policy play its turn.
    ///
    /// Returns `None` when the seat has no policy (a human is to play).
    pub async fn play_bot_turn(&mut self) -> Result<Option<BotTurn>, EngineError> {
        let turn = self.turn.as_mut().ok_or(EngineError::NotStarted)?;
        if turn.is_over() {
            return Err(EngineError::GameOver);
        }
        let Some(policy) = self.policies[turn.current_player()].as_deref_mut() else {
            return Ok(None);
        };

        let summary = self.driver.play_turn(turn, policy).await?;
        self.rolls += summary.rolls;
        Ok(Some(summary))
    }

    /// Play bot turns until the game ends or `max_rolls` rolls were made.
    ///
    /// Every seat needs a policy.
    pub async fn autoplay(&mut self, max_rolls: usize) -> Result<GameSummary, EngineError> {
        let turn = self.turn()?;
        if let Some(seat) = turn
            .roster()
            .seats()
            .iter()
            .find(|s| self.policies[s.player].is_none())
        {
            return Err(EngineError::InvalidRoster(format!(
                "{} has no bot policy",
                seat.player
            )));
        }

        while !self.is_over() && self.rolls < max_rolls {
            self.play_bot_turn().await?;
        }

        let turn = self.turn()?;
        let summary = GameSummary {
            standings: turn.standings(),
            rolls: self.rolls,
            completed: turn.is_over(),
        };
        if !summary.completed {
            warn!(rolls = self.rolls, max_rolls, "autoplay stopped before the game ended");
        }
        Ok(summary)
    }

    // === Persistence boundary ===

    pub fn snapshot(&self) -> Result<GameSnapshot, EngineError> {
        Ok(GameSnapshot::capture(self.turn()?))
    }

    /// Replace the game in progress with a saved one.
    ///
    /// A snapshot that fails validation leaves the session untouched.
    pub fn restore(&mut self, snapshot: GameSnapshot) -> Result<(), EngineError> {
        if let Err(err) = snapshot.validate() {
            warn!(error = %err, "snapshot rejected");
            return Err(err);
        }

        let cancel = CancellationToken::new();
        let turn = snapshot
            .into_orchestrator(
                self.events.clone(),
                self.acks.clone(),
                self.config.timings.clone(),
                cancel.clone(),
            )
            .inspect_err(|err| warn!(error = %err, "snapshot rejected"))?;

        self.teardown();
        self.cancel = cancel;
        for seat in turn.roster().seats() {
            if seat.is_bot {
                self.policies[seat.player] =
                    Some(Box::new(HeuristicBot::new(self.config.bot.clone())));
            }
        }
        info!(player = %turn.current_player(), phase = ?turn.phase(), "game restored");
        self.turn = Some(turn);
        Ok(())
    }
}
