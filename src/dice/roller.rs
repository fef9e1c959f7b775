//! Dice state machine: `idle -> rolling -> idle`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{GameRng, GameRngState, PlayerId};
use crate::events::{AckGate, AckKind, EventBus, GameEvent};

/// Consecutive sixes that end a turn.
pub const BUST_SIXES: u8 = 3;

/// A resolved roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub value: u8,
    /// Sixes in a row including this roll (0 when this roll is not a six).
    pub consecutive_sixes: u8,
}

impl Roll {
    #[must_use]
    pub fn is_six(&self) -> bool {
        self.value == 6
    }

    /// True on the third six in a row.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        self.consecutive_sixes >= BUST_SIXES
    }
}

/// Serializable dice state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSnapshot {
    pub value: Option<u8>,
    pub consecutive_sixes: u8,
    pub rng: GameRngState,
}

/// The session's die.
#[derive(Clone, Debug)]
pub struct Dice {
    rng: GameRng,
    value: Option<u8>,
    is_rolling: bool,
    can_roll: bool,
    consecutive_sixes: u8,
    forced: Option<u8>,
}

impl Dice {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            value: None,
            is_rolling: false,
            can_roll: true,
            consecutive_sixes: 0,
            forced: None,
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: &DiceSnapshot) -> Self {
        Self {
            rng: GameRng::from_state(&snapshot.rng),
            value: snapshot.value,
            is_rolling: false,
            can_roll: true,
            consecutive_sixes: snapshot.consecutive_sixes,
            forced: None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> DiceSnapshot {
        DiceSnapshot {
            value: self.value,
            consecutive_sixes: self.consecutive_sixes,
            rng: self.rng.state(),
        }
    }

    /// Last resolved value.
    #[must_use]
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    #[must_use]
    pub fn is_rolling(&self) -> bool {
        self.is_rolling
    }

    #[must_use]
    pub fn can_roll(&self) -> bool {
        self.can_roll && !self.is_rolling
    }

    pub fn set_can_roll(&mut self, can_roll: bool) {
        self.can_roll = can_roll;
    }

    #[must_use]
    pub fn consecutive_sixes(&self) -> u8 {
        self.consecutive_sixes
    }

    /// Forget the six streak (turn passed to another player).
    pub fn reset_streak(&mut self) {
        self.consecutive_sixes = 0;
    }

    /// Force the next roll. Values outside 1-6 are ignored.
    ///
    /// Returns whether the value was accepted.
    pub fn force_next(&mut self, value: u8) -> bool {
        if (1..=6).contains(&value) {
            self.forced = Some(value);
            debug!(value, "next roll forced");
            true
        } else {
            warn!(value, "ignoring forced dice value outside 1-6");
            false
        }
    }

    #[must_use]
    pub fn forced(&self) -> Option<u8> {
        self.forced
    }

    /// Roll for `player`.
    ///
    /// Publishes `roll-started`, waits up to `ack_limit` for the dice
    /// animation, then settles the value and publishes `roll-resolved`.
    pub async fn roll(
        &mut self,
        player: PlayerId,
        events: &EventBus,
        acks: &AckGate,
        ack_limit: Duration,
    ) -> Roll {
        let value = self.forced.take().unwrap_or_else(|| self.rng.roll_die());
        self.is_rolling = true;
        self.can_roll = false;

        let pending = acks.arm(AckKind::DiceAnimation);
        events.publish(GameEvent::RollStarted { player });
        pending.wait(ack_limit).await;

        let roll = self.settle(value);
        events.publish(GameEvent::RollResolved { player, value });
        debug!(%player, value, streak = roll.consecutive_sixes, "roll resolved");
        roll
    }

    fn settle(&mut self, value: u8) -> Roll {
        self.is_rolling = false;
        self.value = Some(value);
        self.consecutive_sixes = if value == 6 {
            self.consecutive_sixes + 1
        } else {
            0
        };

        let roll = Roll {
            value,
            consecutive_sixes: self.consecutive_sixes,
        };
        if self.consecutive_sixes >= BUST_SIXES {
            self.consecutive_sixes = 0;
        }
        roll
    }
}
