//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! One of the four canonical Ludo colours. The index doubles as the seat on
//! the board, which fixes the player's start cell (see `board`).
//!
//! ## PlayerMap
//!
//! Fixed-size per-colour storage indexed by `PlayerId`, covering all four
//! colours whether or not they are seated in the current game.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of colours on a Ludo board.
pub const MAX_PLAYERS: usize = 4;

/// Player identifier (0 = Red, 1 = Green, 2 = Yellow, 3 = Blue).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const RED: PlayerId = PlayerId(0);
    pub const GREEN: PlayerId = PlayerId(1);
    pub const YELLOW: PlayerId = PlayerId(2);
    pub const BLUE: PlayerId = PlayerId(3);

    /// Create a player ID, returning `None` outside the four colours.
    #[must_use]
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < MAX_PLAYERS {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Lowercase colour name, used in token identifiers ("red-0").
    #[must_use]
    pub const fn color_name(self) -> &'static str {
        match self.0 {
            0 => "red",
            1 => "green",
            2 => "yellow",
            _ => "blue",
        }
    }

    /// Parse a lowercase colour name.
    #[must_use]
    pub fn from_color_name(name: &str) -> Option<Self> {
        Self::all().find(|p| p.color_name() == name)
    }

    /// Iterate over all four colours in seat order.
    pub fn all() -> impl Iterator<Item = PlayerId> {
        (0..MAX_PLAYERS as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.color_name())
    }
}

/// Per-colour data storage with O(1) access.
///
/// Always holds one entry per colour. Seats that are not part of the
/// current roster simply keep their initial value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; MAX_PLAYERS],
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: std::array::from_fn(|i| factory(PlayerId(i as u8))),
        }
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T: Default> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        assert_eq!(PlayerId::RED.index(), 0);
        assert_eq!(PlayerId::BLUE.index(), 3);
        assert_eq!(PlayerId::new(4), None);
        assert_eq!(PlayerId::new(2), Some(PlayerId::YELLOW));
        assert_eq!(format!("{}", PlayerId::GREEN), "green");
    }

    #[test]
    fn test_color_name_round_trip() {
        for player in PlayerId::all() {
            assert_eq!(PlayerId::from_color_name(player.color_name()), Some(player));
        }
        assert_eq!(PlayerId::from_color_name("purple"), None);
    }

    #[test]
    fn test_player_map() {
        let mut map: PlayerMap<u32> = PlayerMap::new(|p| p.index() as u32 * 10);
        assert_eq!(map[PlayerId::YELLOW], 20);

        map[PlayerId::YELLOW] = 7;
        assert_eq!(map[PlayerId::YELLOW], 7);

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs.len(), MAX_PLAYERS);
        assert_eq!(pairs[3], (PlayerId::BLUE, &30));
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<bool> = PlayerMap::new(|p| p == PlayerId::GREEN);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
