//! Track layout tables and the steps <-> position mapping.
//!
//! ## Layout
//!
//! The main track is a loop of 52 cells numbered 0-51. Players enter 13
//! cells apart at cells 1, 14, 27 and 40. A token that has travelled `s`
//! steps (0 at its start cell) is at:
//!
//! - `0 <= s <= 50`: main track cell `(start + s) % 52`; `s == 50` is the
//!   home entry cell
//! - `51 <= s < finish`: home stretch cell `s - 51`
//! - `s == finish`: finished, where `finish = 51 + (home_stretch_length - 1)`
//!
//! ```
//! use ludo_engine::board::{Board, Position};
//! use ludo_engine::core::PlayerId;
//!
//! let board = Board::standard();
//! assert_eq!(board.locate(PlayerId::RED, 0), Some(Position::Track(1)));
//! assert_eq!(board.locate(PlayerId::RED, 52), Some(Position::HomeStretch(1)));
//! assert_eq!(board.locate(PlayerId::RED, 56), Some(Position::Finished));
//! assert_eq!(board.locate(PlayerId::RED, 57), None);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{PlayerId, DEFAULT_HOME_STRETCH_LENGTH, HOME_STRETCH_RANGE};

/// Cells on the shared loop.
pub const TRACK_LENGTH: u8 = 52;

/// Main-track entry cell per colour.
pub const START_OFFSETS: [u8; 4] = [1, 14, 27, 40];

/// Steps travelled when standing on the home entry cell.
pub const HOME_ENTRY_STEPS: u8 = 50;

/// Cells where captures cannot happen: every start cell plus one star per arm.
pub const SAFE_CELLS: [u8; 8] = [1, 9, 14, 22, 27, 35, 40, 48];

/// Coarse token state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenState {
    SpawnedAtBase,
    OnTrack,
    InHomeStretch,
    Finished,
}

/// Where a token is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Waiting in the spawn area.
    Base,
    /// On the shared loop, at this cell.
    Track(u8),
    /// In the owner's private lane, at this cell index (0-based).
    HomeStretch(u8),
    /// Reached home.
    Finished,
}

impl Position {
    #[must_use]
    pub const fn state(self) -> TokenState {
        match self {
            Position::Base => TokenState::SpawnedAtBase,
            Position::Track(_) => TokenState::OnTrack,
            Position::HomeStretch(_) => TokenState::InHomeStretch,
            Position::Finished => TokenState::Finished,
        }
    }

    /// Main track cell, if on the main track.
    #[must_use]
    pub const fn track_cell(self) -> Option<u8> {
        match self {
            Position::Track(cell) => Some(cell),
            _ => None,
        }
    }

    /// Main track cell, or -1 when not on the main track.
    #[must_use]
    pub const fn track_position(self) -> i16 {
        match self {
            Position::Track(cell) => cell as i16,
            _ => -1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Base => f.write_str("base"),
            Position::Track(cell) => write!(f, "cell {cell}"),
            Position::HomeStretch(cell) => write!(f, "home {cell}"),
            Position::Finished => f.write_str("finished"),
        }
    }
}

/// Board geometry for one game variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(deserialize_with = "clamped_length")]
    home_stretch_length: u8,
}

fn clamped_length<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    u8::deserialize(deserializer).map(|length| Board::with_home_stretch_length(length).home_stretch_length)
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Board with the canonical six-cell home stretch.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            home_stretch_length: DEFAULT_HOME_STRETCH_LENGTH,
        }
    }

    /// Board with a custom home stretch length, clamped to 2-12.
    #[must_use]
    pub fn with_home_stretch_length(home_stretch_length: u8) -> Self {
        Self {
            home_stretch_length: home_stretch_length
                .clamp(*HOME_STRETCH_RANGE.start(), *HOME_STRETCH_RANGE.end()),
        }
    }

    #[must_use]
    pub const fn home_stretch_length(&self) -> u8 {
        self.home_stretch_length
    }

    /// Steps from start to the finish cell.
    #[must_use]
    pub const fn finish_steps(&self) -> u8 {
        HOME_ENTRY_STEPS + 1 + (self.home_stretch_length - 1)
    }

    /// Main-track entry cell for a player.
    #[must_use]
    pub const fn start_offset(&self, player: PlayerId) -> u8 {
        START_OFFSETS[player.index()]
    }

    /// Last main-track cell before the player turns into the home stretch.
    #[must_use]
    pub const fn home_entry_offset(&self, player: PlayerId) -> u8 {
        (self.start_offset(player) + HOME_ENTRY_STEPS) % TRACK_LENGTH
    }

    #[must_use]
    pub fn is_safe_cell(&self, cell: u8) -> bool {
        SAFE_CELLS.contains(&cell)
    }

    #[must_use]
    pub fn is_start_cell(&self, cell: u8) -> bool {
        START_OFFSETS.contains(&cell)
    }

    /// Position of a player's token that has travelled `steps`.
    ///
    /// Returns `None` past the finish.
    #[must_use]
    pub fn locate(&self, player: PlayerId, steps: u8) -> Option<Position> {
        let finish = self.finish_steps();
        if steps > finish {
            None
        } else if steps == finish {
            Some(Position::Finished)
        } else if steps > HOME_ENTRY_STEPS {
            Some(Position::HomeStretch(steps - HOME_ENTRY_STEPS - 1))
        } else {
            let cell = (self.start_offset(player) as u16 + steps as u16) % TRACK_LENGTH as u16;
            Some(Position::Track(cell as u8))
        }
    }

    /// Inverse of [`locate`](Self::locate) for positions on the board.
    ///
    /// Returns `None` for `Base` and for positions the player cannot occupy.
    #[must_use]
    pub fn steps_for(&self, player: PlayerId, position: Position) -> Option<u8> {
        match position {
            Position::Base => None,
            Position::Track(cell) if cell < TRACK_LENGTH => {
                Some(self.track_distance(self.start_offset(player), cell))
            }
            Position::Track(_) => None,
            Position::HomeStretch(index) if index < self.home_stretch_length - 1 => {
                Some(HOME_ENTRY_STEPS + 1 + index)
            }
            Position::HomeStretch(_) => None,
            Position::Finished => Some(self.finish_steps()),
        }
    }

    /// Forward distance along the loop from `from` to `to` (0-51).
    #[must_use]
    pub const fn track_distance(&self, from: u8, to: u8) -> u8 {
        (to + TRACK_LENGTH - from % TRACK_LENGTH) % TRACK_LENGTH
    }
}
