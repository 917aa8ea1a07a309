use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_seven(self) -> bool {
        matches!(self.rank, Rank::Seven)
    }
}

/// Suit first, then rank; the order hands are kept in.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suit
            .cmp(&other.suit)
            .then(self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError {
    input: String,
}

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a card (expected e.g. 7H, 10S, QD)", self.input)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses `<rank><suit>` such as `7H`, `10♠` or `qd`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError {
            input: s.to_string(),
        };
        let text = s.trim();
        let suit_char = text.chars().last().ok_or_else(err)?;
        let rank_text = &text[..text.len() - suit_char.len_utf8()];

        let suit = suit_char
            .to_string()
            .parse::<Suit>()
            .map_err(|_| err())?;
        let rank = match rank_text.to_ascii_uppercase().as_str() {
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            "T" => Rank::Ten,
            digits => digits
                .parse::<u8>()
                .ok()
                .and_then(Rank::from_value)
                .ok_or_else(err)?,
        };
        Ok(Card::new(rank, suit))
    }
}
