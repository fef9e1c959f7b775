//! Notification channel between the engine and its presentation layers.
//!
//! - [`GameEvent`]: everything the engine announces (rolls, moves,
//!   captures, turn changes, game lifecycle)
//! - [`EventBus`]: injectable publish/subscribe channel owned by a session.
//!   Publishing never depends on anyone listening.
//! - [`AckGate`]: the inbound side. Renderers signal that a dice, move or
//!   capture animation finished; the engine waits for that signal with a
//!   bound and carries on either way.

mod ack;
mod bus;
mod event;

pub use ack::{AckGate, AckKind, AckOutcome, PendingAck};
pub use bus::{EventBus, Subscription};
pub use event::{ExtraTurnReason, GameEvent};
