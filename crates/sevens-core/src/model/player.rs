use core::fmt;
use serde::{Deserialize, Serialize};

/// Seat in registration order. Turns rotate through ids `0..player_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().map(Self)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.0 as usize + 1) % player_count) as u8)
    }

    /// All seats of a table with `player_count` players.
    pub fn seats(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).filter_map(PlayerId::from_index)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::PlayerId;

    #[test]
    fn next_wraps_around() {
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(2).next(4), PlayerId::new(3));
        assert_eq!(PlayerId::new(3).next(4), PlayerId::new(0));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(PlayerId::new(0).to_string(), "Player 1");
    }

    #[test]
    fn index_roundtrip() {
        for (i, seat) in PlayerId::seats(3).enumerate() {
            assert_eq!(PlayerId::from_index(i), Some(seat));
            assert_eq!(seat.index(), i);
        }
        assert_eq!(PlayerId::seats(3).count(), 3);
    }
}
