//! Rules engine.
//!
//! The legality and mutation authority for token moves. Holds no state of
//! its own: every function takes the [`TokenStore`](crate::tokens::TokenStore)
//! it validates against or mutates.
//!
//! - `is_legal` / `legal_moves`: which tokens may move for a dice value
//! - `execute`: apply a move, reporting capture, home arrival and extra turn
//! - `check_win` / `progress`: per-player standing
//!
//! Captures are reported, never applied: the caller resets the captured
//! token once the capture has been shown.

mod engine;

pub use engine::{
    capture_target, check_win, destination, execute, is_legal, legal_moves, progress, LegalMove,
    MoveList, MoveOutcome,
};
