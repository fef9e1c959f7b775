//! Core engine types: players, tokens, roster, RNG, configuration.
//!
//! These are the building blocks every other module shares. Nothing here
//! knows about turn flow or rules.

pub mod config;
pub mod player;
pub mod rng;
pub mod roster;
pub mod token_id;

pub use config::{EngineConfig, Timings, DEFAULT_HOME_STRETCH_LENGTH, HOME_STRETCH_RANGE};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use rng::{GameRng, GameRngState};
pub use roster::{Roster, Seat};
pub use token_id::{ParseTokenIdError, TokenId, TOKENS_PER_PLAYER};
