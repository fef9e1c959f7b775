//! Token state store.
//!
//! Owns every token record for the seated players. Records change only
//! through the store's transitions (enter board, advance, capture reset,
//! admin placement), each of which keeps a token's travelled steps and its
//! position in agreement.

mod store;

pub use store::{Placement, Step, Token, TokenStore};
