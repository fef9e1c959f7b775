//! Engine configuration.
//!
//! `EngineConfig` is the one place a session is tuned: dice seed, board
//! variant, event buffer size, animation wait bounds and bot weights.
//! Every field has a default, so JSON configs only need the keys they change.
//!
//! ```
//! use ludo_engine::core::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "seed": 9, "timings": { "move_ack_ms": 50 } }"#).unwrap();
//! assert_eq!(config.seed, 9);
//! assert_eq!(config.home_stretch_length, 6);
//! assert_eq!(config.timings.move_ack_ms, 50);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bot::BotWeights;
use crate::error::EngineError;

/// Canonical home stretch length (cells from home entry to finish).
pub const DEFAULT_HOME_STRETCH_LENGTH: u8 = 6;

/// Supported home stretch lengths.
pub const HOME_STRETCH_RANGE: std::ops::RangeInclusive<u8> = 2..=12;

/// Bounds on how long the engine waits for presentation layers.
///
/// All values are milliseconds. A wait that reaches its bound proceeds as
/// if acknowledged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Wait for "dice-animation-complete".
    pub dice_ack_ms: u64,
    /// Wait for "move-animation-complete".
    pub move_ack_ms: u64,
    /// Wait for "capture-animation-complete". Longer than a move.
    pub capture_ack_ms: u64,
    /// Pause before passing the turn when a roll has no legal moves.
    pub no_move_delay_ms: u64,
    /// Interval at which the bot driver re-checks the turn phase.
    pub bot_poll_ms: u64,
    /// Pause before a bot acts, so humans can follow along.
    pub bot_think_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            dice_ack_ms: 2_000,
            move_ack_ms: 3_000,
            capture_ack_ms: 5_000,
            no_move_delay_ms: 800,
            bot_poll_ms: 100,
            bot_think_ms: 300,
        }
    }
}

impl Timings {
    /// Zero waits everywhere, for headless play and simulations.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            dice_ack_ms: 0,
            move_ack_ms: 0,
            capture_ack_ms: 0,
            no_move_delay_ms: 0,
            bot_poll_ms: 0,
            bot_think_ms: 0,
        }
    }

    pub fn dice_ack(&self) -> Duration {
        Duration::from_millis(self.dice_ack_ms)
    }

    pub fn move_ack(&self) -> Duration {
        Duration::from_millis(self.move_ack_ms)
    }

    pub fn capture_ack(&self) -> Duration {
        Duration::from_millis(self.capture_ack_ms)
    }

    pub fn no_move_delay(&self) -> Duration {
        Duration::from_millis(self.no_move_delay_ms)
    }

    pub fn bot_poll(&self) -> Duration {
        Duration::from_millis(self.bot_poll_ms)
    }

    pub fn bot_think(&self) -> Duration {
        Duration::from_millis(self.bot_think_ms)
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dice RNG seed. Same seed and same inputs replay the same game.
    pub seed: u64,

    /// Home stretch length, canonically 6. The finish is reached after
    /// `51 + (home_stretch_length - 1)` steps.
    pub home_stretch_length: u8,

    /// Buffered notifications per subscriber before slow subscribers lag.
    pub event_capacity: usize,

    /// Animation wait bounds.
    pub timings: Timings,

    /// Heuristic bot weights.
    pub bot: BotWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            home_stretch_length: DEFAULT_HOME_STRETCH_LENGTH,
            event_capacity: 256,
            timings: Timings::default(),
            bot: BotWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Create a config with a custom home stretch length.
    #[must_use]
    pub fn with_home_stretch_length(mut self, length: u8) -> Self {
        self.home_stretch_length = length;
        self
    }

    /// Create a config with custom timings.
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Create a config with custom bot weights.
    #[must_use]
    pub fn with_bot_weights(mut self, weights: BotWeights) -> Self {
        self.bot = weights;
        self
    }

    /// Headless preset: zero waits, given seed.
    #[must_use]
    pub fn headless(seed: u64) -> Self {
        Self::default().with_seed(seed).with_timings(Timings::instant())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !HOME_STRETCH_RANGE.contains(&self.home_stretch_length) {
            return Err(EngineError::InvalidConfig(format!(
                "home_stretch_length must be 2-12, got {}",
                self.home_stretch_length
            )));
        }
        if self.event_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.home_stretch_length, 6);
        assert!(config.timings.capture_ack_ms > config.timings.move_ack_ms);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_seed(123)
            .with_home_stretch_length(4)
            .with_timings(Timings::instant());

        assert_eq!(config.seed, 123);
        assert_eq!(config.home_stretch_length, 4);
        assert_eq!(config.timings.capture_ack(), Duration::ZERO);
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::default().with_home_stretch_length(1).validate().is_err());
        assert!(EngineConfig::default().with_home_stretch_length(13).validate().is_err());
        assert!(matches!(
            EngineConfig::from_json(r#"{ "event_capacity": 0 }"#),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::headless(5);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized = EngineConfig::from_json(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
