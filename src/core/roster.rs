//! Player roster: who is seated, in which turn order, and who is a bot.
//!
//! The roster is fixed for the duration of a game. Turn order follows seat
//! order in the roster, not colour order.

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, MAX_PLAYERS};
use crate::error::EngineError;

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub player: PlayerId,
    pub name: String,
    pub is_bot: bool,
}

/// Ordered list of active players (2-4 of the four colours).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    seats: Vec<Seat>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical seating for `count` players.
    ///
    /// Two players sit opposite each other (Red, Yellow); three take Red,
    /// Green, Yellow; four take every colour. `bots` marks how many of the
    /// trailing seats are bots.
    pub fn standard(count: usize, bots: usize) -> Result<Self, EngineError> {
        let colors: &[PlayerId] = match count {
            2 => &[PlayerId::RED, PlayerId::YELLOW],
            3 => &[PlayerId::RED, PlayerId::GREEN, PlayerId::YELLOW],
            4 => &[PlayerId::RED, PlayerId::GREEN, PlayerId::YELLOW, PlayerId::BLUE],
            _ => {
                return Err(EngineError::InvalidRoster(format!(
                    "player count must be 2-4, got {count}"
                )))
            }
        };
        if bots > count {
            return Err(EngineError::InvalidRoster(format!(
                "{bots} bots requested for {count} seats"
            )));
        }

        let humans = count - bots;
        let roster = colors
            .iter()
            .enumerate()
            .fold(Self::new(), |roster, (seat, &player)| {
                if seat < humans {
                    roster.human(player, player.color_name())
                } else {
                    roster.bot(player, player.color_name())
                }
            });
        roster.validate()?;
        Ok(roster)
    }

    /// Seat a human player (builder pattern).
    #[must_use]
    pub fn human(mut self, player: PlayerId, name: impl Into<String>) -> Self {
        self.seats.push(Seat {
            player,
            name: name.into(),
            is_bot: false,
        });
        self
    }

    /// Seat a bot player (builder pattern).
    #[must_use]
    pub fn bot(mut self, player: PlayerId, name: impl Into<String>) -> Self {
        self.seats.push(Seat {
            player,
            name: name.into(),
            is_bot: true,
        });
        self
    }

    /// Check seat count and colour uniqueness.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(2..=MAX_PLAYERS).contains(&self.seats.len()) {
            return Err(EngineError::InvalidRoster(format!(
                "roster must seat 2-4 players, got {}",
                self.seats.len()
            )));
        }
        for (i, seat) in self.seats.iter().enumerate() {
            if self.seats[..i].iter().any(|s| s.player == seat.player) {
                return Err(EngineError::InvalidRoster(format!(
                    "{} is seated twice",
                    seat.player
                )));
            }
        }
        Ok(())
    }

    /// Number of seated players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Seats in turn order.
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Seat at a turn-order position.
    #[must_use]
    pub fn seat(&self, turn_index: usize) -> Option<&Seat> {
        self.seats.get(turn_index)
    }

    /// Seated players in turn order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.seats.iter().map(|s| s.player)
    }

    /// Turn-order position of a player.
    #[must_use]
    pub fn turn_index_of(&self, player: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.player == player)
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.turn_index_of(player).is_some()
    }

    #[must_use]
    pub fn is_bot(&self, player: PlayerId) -> bool {
        self.seats.iter().any(|s| s.player == player && s.is_bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_two_players_sit_opposite() {
        let roster = Roster::standard(2, 0).unwrap();
        let players: Vec<_> = roster.players().collect();
        assert_eq!(players, vec![PlayerId::RED, PlayerId::YELLOW]);
        assert!(!roster.is_bot(PlayerId::RED));
    }

    #[test]
    fn test_standard_bots_take_trailing_seats() {
        let roster = Roster::standard(4, 3).unwrap();
        assert!(!roster.is_bot(PlayerId::RED));
        assert!(roster.is_bot(PlayerId::GREEN));
        assert!(roster.is_bot(PlayerId::BLUE));
        assert_eq!(roster.seat(3).unwrap().name, "blue");
    }

    #[test]
    fn test_standard_rejects_bad_counts() {
        assert!(Roster::standard(1, 0).is_err());
        assert!(Roster::standard(5, 0).is_err());
        assert!(Roster::standard(2, 3).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let roster = Roster::new()
            .human(PlayerId::RED, "a")
            .bot(PlayerId::RED, "b");
        assert!(matches!(roster.validate(), Err(EngineError::InvalidRoster(_))));
    }

    #[test]
    fn test_custom_turn_order() {
        let roster = Roster::new()
            .human(PlayerId::BLUE, "Ada")
            .bot(PlayerId::GREEN, "Bot");
        assert!(roster.validate().is_ok());
        assert_eq!(roster.turn_index_of(PlayerId::GREEN), Some(1));
        assert_eq!(roster.turn_index_of(PlayerId::RED), None);
        assert!(roster.contains(PlayerId::BLUE));
    }
}
