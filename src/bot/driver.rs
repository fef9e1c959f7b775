//! Plays a bot seat's turn.
//!
//! The driver checks the orchestrator's phase and acts when the seat is
//! expected to: roll in `WaitingForRoll`, choose in `WaitingForMove`. Any
//! other phase is polled again after a short fixed delay.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::policy::MovePolicy;
use crate::core::{PlayerId, Timings};
use crate::error::EngineError;
use crate::rules::MoveOutcome;
use crate::turn::{RollResult, TurnOrchestrator, TurnPhase};

/// Polls before the driver gives up on a phase that never settles.
const MAX_IDLE_POLLS: u32 = 100;

/// What a bot did with its turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotTurn {
    pub player: PlayerId,
    /// Rolls made, extra turns included.
    pub rolls: usize,
    pub moves: Vec<MoveOutcome>,
}

/// Drives a bot seat through the orchestrator.
#[derive(Clone, Debug)]
pub struct BotDriver {
    think: Duration,
    poll: Duration,
}

impl Default for BotDriver {
    fn default() -> Self {
        Self::new(&Timings::default())
    }
}

impl BotDriver {
    #[must_use]
    pub fn new(timings: &Timings) -> Self {
        Self {
            think: timings.bot_think(),
            poll: timings.bot_poll(),
        }
    }

    /// Play until the turn passes to another seat or the game ends.
    pub async fn play_turn(
        &self,
        turn: &mut TurnOrchestrator,
        policy: &mut dyn MovePolicy,
    ) -> Result<BotTurn, EngineError> {
        let player = turn.current_player();
        let mut summary = BotTurn {
            player,
            rolls: 0,
            moves: Vec::new(),
        };
        let mut idle_polls = 0;

        while turn.current_player() == player {
            match turn.phase() {
                TurnPhase::GameOver => break,
                TurnPhase::WaitingForRoll => {
                    self.pause(self.think).await;
                    summary.rolls += 1;
                    if let RollResult::AutoMoved(outcome) = turn.roll().await? {
                        summary.moves.push(outcome);
                    }
                }
                TurnPhase::WaitingForMove => {
                    self.pause(self.think).await;
                    let moves = turn.legal_moves().clone();
                    let choice = policy
                        .choose(turn.store(), &moves)
                        .or_else(|| moves.first().copied())
                        .ok_or(EngineError::WrongPhase {
                            expected: TurnPhase::WaitingForMove,
                            actual: turn.phase(),
                        })?;
                    debug!(%player, token = %choice.token, policy = policy.name(), "bot chose move");
                    summary.moves.push(turn.select(choice.token).await?);
                }
                phase => {
                    idle_polls += 1;
                    if idle_polls > MAX_IDLE_POLLS {
                        warn!(%player, ?phase, "bot gave up waiting for its turn");
                        break;
                    }
                    self.pause(self.poll).await;
                }
            }
        }
        Ok(summary)
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{HeuristicBot, RandomBot};
    use crate::core::{EngineConfig, Roster, TokenId};
    use crate::events::{AckGate, EventBus};
    use crate::tokens::Placement;
    use tokio_util::sync::CancellationToken;

    fn orchestrator() -> TurnOrchestrator {
        TurnOrchestrator::new(
            Roster::standard(2, 2).unwrap(),
            &EngineConfig::headless(1),
            EventBus::new(256),
            AckGate::new(),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_turn_ends_with_other_player_to_roll() {
        let mut turn = orchestrator();
        turn.force_next_roll(2);
        let driver = BotDriver::new(&Timings::instant());

        let summary = driver
            .play_turn(&mut turn, &mut HeuristicBot::default())
            .await
            .unwrap();
        assert_eq!(summary.player, PlayerId::RED);
        assert_eq!(summary.rolls, 1);
        assert!(summary.moves.is_empty());
        assert_eq!(turn.current_player(), PlayerId::YELLOW);
    }

    #[tokio::test]
    async fn test_bot_selects_when_several_moves() {
        let mut turn = orchestrator();
        turn.place_token(TokenId::new(PlayerId::RED, 0).unwrap(), Placement::Steps(4))
            .unwrap();
        turn.force_next_roll(6);
        let driver = BotDriver::new(&Timings::instant());

        let summary = driver
            .play_turn(&mut turn, &mut RandomBot::new(5))
            .await
            .unwrap();
        // The six grants a second roll, so at least two rolls happened.
        assert!(summary.rolls >= 2);
        assert!(!summary.moves.is_empty());
        assert_eq!(summary.moves[0].dice, 6);
        assert_ne!(turn.current_player(), PlayerId::RED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_think_delay_is_observed() {
        let mut turn = orchestrator();
        turn.force_next_roll(1);
        let timings = Timings {
            bot_think_ms: 300,
            ..Timings::instant()
        };
        let start = tokio::time::Instant::now();
        BotDriver::new(&timings)
            .play_turn(&mut turn, &mut HeuristicBot::default())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
