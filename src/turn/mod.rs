//! Turn orchestration.
//!
//! [`TurnOrchestrator`] sequences one player's turn:
//!
//! ```text
//! waiting-for-roll -> rolling -> waiting-for-move -> moving -> animating
//!        ^              |                                        |
//!        +--------------+---- extra turn / no moves on a six ----+
//!                       |                                        |
//!                       +-------------> turn-ending <------------+
//! ```
//!
//! Rolls and moves are `async`: they suspend on animation acknowledgements
//! (bounded by [`Timings`](crate::core::Timings)) and nowhere else.

mod orchestrator;
mod phase;

pub use orchestrator::{RollResult, TurnOrchestrator};
pub use phase::{TurnPhase, TurnState};
