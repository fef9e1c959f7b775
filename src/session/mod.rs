//! Game sessions.
//!
//! A [`GameSession`] owns one game end to end: it starts and resets games,
//! hands out the event subscription and acknowledgement handles, drives
//! bot seats, and captures or restores [`GameSnapshot`]s for an external
//! save/load component.

mod game;
mod snapshot;

pub use game::{GameSession, GameSummary, ResetHandle};
pub use snapshot::{GameSnapshot, SNAPSHOT_VERSION};
