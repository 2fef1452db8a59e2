//! Game identifiers.
//!
//! An identifier such as `2016020123` encodes the season it belongs to
//! (`2016`), a game-type digit (`2`, regular season) and a sequence number.

use serde::Deserialize;
use std::fmt;

/// Game-type digit for regular-season games.
pub const REGULAR_SEASON: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl GameId {
    /// Digit at the 10^4 place.
    pub fn game_type(self) -> u8 {
        ((self.0 / 10_000) % 10) as u8
    }

    pub fn is_regular_season(self) -> bool {
        self.game_type() == REGULAR_SEASON
    }

    /// Year the season began.
    pub fn season(self) -> i32 {
        (self.0 / 1_000_000) as i32
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GameId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_digit_for_every_value() {
        for digit in 0..10i64 {
            let id = GameId(2_016_000_000 + digit * 10_000 + 123);
            assert_eq!(id.game_type(), digit as u8);
            assert_eq!(id.is_regular_season(), digit == 2, "digit {digit}");
        }
    }

    #[test]
    fn test_season_derivation() {
        assert_eq!(GameId(2016020123).season(), 2016);
        assert_eq!(GameId(2016999999).season(), 2016);
        assert_eq!(GameId(2017000000).season(), 2017);
        assert_eq!(GameId(2019030411).season(), 2019);
    }

    #[test]
    fn test_playoff_and_preseason_are_not_regular() {
        assert!(!GameId(2016010001).is_regular_season());
        assert!(!GameId(2016030111).is_regular_season());
        assert!(GameId(2016021230).is_regular_season());
    }
}
