//! Dice subsystem.
//!
//! Produces 1-6 values from the session's seeded RNG, counts consecutive
//! sixes, and honours a single-use forced value for debugging and tests.
//! It only counts sixes; the turn orchestrator enforces the bust rule.

mod roller;

pub use roller::{Dice, DiceSnapshot, Roll, BUST_SIXES};
