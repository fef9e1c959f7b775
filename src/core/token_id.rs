//! Token identification.
//!
//! Every token is addressed by its owner and its index within that owner's
//! set of four. The textual form is `<colour>-<index>`, e.g. `red-0`, which
//! is what renderers and save files use.
//!
//! ```
//! use ludo_engine::core::{PlayerId, TokenId};
//!
//! let id: TokenId = "yellow-3".parse().unwrap();
//! assert_eq!(id.player, PlayerId::YELLOW);
//! assert_eq!(id.index, 3);
//! assert_eq!(id.to_string(), "yellow-3");
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::player::PlayerId;

/// Tokens per player.
pub const TOKENS_PER_PLAYER: u8 = 4;

/// Unique identifier for a token.
///
/// Ordering is by player, then index, which is the order legal moves and
/// store iteration use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId {
    pub player: PlayerId,
    pub index: u8,
}

impl TokenId {
    /// Create a token ID. Returns `None` for an index outside 0-3.
    #[must_use]
    pub const fn new(player: PlayerId, index: u8) -> Option<Self> {
        if index < TOKENS_PER_PLAYER {
            Some(Self { player, index })
        } else {
            None
        }
    }

    /// All four token IDs of a player, in index order.
    pub fn all_for(player: PlayerId) -> impl Iterator<Item = TokenId> {
        (0..TOKENS_PER_PLAYER).map(move |index| TokenId { player, index })
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.player, self.index)
    }
}

/// Error returned when parsing a malformed token identifier.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed token id '{0}'")]
pub struct ParseTokenIdError(pub String);

impl FromStr for TokenId {
    type Err = ParseTokenIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTokenIdError(s.to_string());
        let (color, index) = s.split_once('-').ok_or_else(err)?;
        let player = PlayerId::from_color_name(color).ok_or_else(err)?;
        let index: u8 = index.parse().map_err(|_| err())?;
        TokenId::new(player, index).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = TokenId::new(PlayerId::RED, 0).unwrap();
        assert_eq!(id.to_string(), "red-0");
        assert_eq!("red-0".parse::<TokenId>(), Ok(id));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("red".parse::<TokenId>().is_err());
        assert!("red-4".parse::<TokenId>().is_err());
        assert!("pink-1".parse::<TokenId>().is_err());
        assert!("blue-x".parse::<TokenId>().is_err());
    }

    #[test]
    fn test_ordering_is_player_then_index() {
        let mut ids = vec![
            TokenId::new(PlayerId::GREEN, 0).unwrap(),
            TokenId::new(PlayerId::RED, 3).unwrap(),
            TokenId::new(PlayerId::RED, 1).unwrap(),
        ];
        ids.sort();
        assert_eq!(ids[0].to_string(), "red-1");
        assert_eq!(ids[1].to_string(), "red-3");
        assert_eq!(ids[2].to_string(), "green-0");
    }

    #[test]
    fn test_all_for() {
        let ids: Vec<_> = TokenId::all_for(PlayerId::BLUE).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| id.player == PlayerId::BLUE));
    }
}
