//! # ludo-engine
//!
//! Rules and turn-orchestration engine for the board game Ludo.
//!
//! ## Design Principles
//!
//! 1. **Transitions Only**: Token records change through a small set of
//!    store transitions (enter board, advance, capture reset). Every one
//!    keeps a token's travelled steps and its position in agreement.
//!
//! 2. **Rules Hold No State**: Validation and execution are functions over
//!    the token store. The orchestrator owns all mutable game state.
//!
//! 3. **Fire-and-Forget Notifications**: The engine publishes events on an
//!    injectable bus and never depends on anyone listening. The only
//!    inbound signals are animation acknowledgements, each awaited with a
//!    bound so the game always moves forward.
//!
//! ## Architecture
//!
//! - **Cooperative async**: rolls and moves suspend only on acknowledgement
//!   waits. State is mutated through `&mut self` between those points.
//!
//! - **Persistent Data Structures**: O(1) store cloning via `im-rs` for
//!   snapshots and bot look-ahead.
//!
//! - **Deterministic dice**: ChaCha8 seeded RNG whose position is part of
//!   every snapshot.
//!
//! ## Modules
//!
//! - `core`: Players, token ids, roster, RNG, configuration
//! - `board`: Track geometry and the position sum type
//! - `tokens`: Token records and their store
//! - `dice`: Die with six-streak tracking and a forced-value hook
//! - `rules`: Move validation, execution, capture, win and progress
//! - `events`: Event bus and animation acknowledgement gate
//! - `turn`: Turn state machine
//! - `bot`: Move policies and the bot turn driver
//! - `session`: Game lifecycle and snapshots

pub mod board;
pub mod bot;
pub mod core;
pub mod dice;
pub mod error;
pub mod events;
pub mod rules;
pub mod session;
pub mod tokens;
pub mod turn;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, GameRng, GameRngState, PlayerId, PlayerMap, Roster, Seat, Timings, TokenId,
};

pub use crate::board::{Board, Position, TokenState};

pub use crate::tokens::{Placement, Token, TokenStore};

pub use crate::dice::{Dice, Roll};

pub use crate::rules::{LegalMove, MoveList, MoveOutcome};

pub use crate::events::{AckGate, AckKind, AckOutcome, EventBus, ExtraTurnReason, GameEvent, Subscription};

pub use crate::turn::{RollResult, TurnOrchestrator, TurnPhase, TurnState};

pub use crate::bot::{BotDriver, BotTurn, BotWeights, HeuristicBot, MovePolicy, RandomBot};

pub use crate::session::{GameSession, GameSnapshot, GameSummary, ResetHandle};

pub use crate::error::EngineError;
