//! Bot players.
//!
//! Bots are trait-based so seats can be given different behaviour:
//! - [`MovePolicy`]: picks one move from the legal set
//! - [`HeuristicBot`]: weighted scoring (capture, safety, home, progress)
//! - [`RandomBot`]: seeded uniform choice, a baseline for self-play
//! - [`BotDriver`]: plays a bot seat's whole turn against the orchestrator

mod driver;
mod heuristic;
mod policy;

pub use driver::{BotDriver, BotTurn};
pub use heuristic::{is_threatened, BotWeights, HeuristicBot};
pub use policy::{MovePolicy, RandomBot};
