//! Board geometry.
//!
//! Pure coordinate mapping from a token's travelled distance to where it
//! sits: at base, on the shared 52-cell loop, in its colour's home stretch,
//! or finished. No mutable game state lives here.

mod geometry;

pub use geometry::{
    Board, Position, TokenState, HOME_ENTRY_STEPS, SAFE_CELLS, START_OFFSETS, TRACK_LENGTH,
};
