use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::rules::validator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive interval of ranks laid out for one suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub low: Rank,
    pub high: Rank,
}

impl Run {
    pub const fn single(rank: Rank) -> Self {
        Self {
            low: rank,
            high: rank,
        }
    }

    pub fn contains(self, rank: Rank) -> bool {
        self.low <= rank && rank <= self.high
    }

    /// True when `rank` sits directly below `low` or directly above `high`.
    pub fn is_adjacent(self, rank: Rank) -> bool {
        self.low.lower() == Some(rank) || self.high.higher() == Some(rank)
    }

    pub fn len(self) -> usize {
        usize::from(self.high.value() - self.low.value()) + 1
    }

    pub fn ranks(self) -> impl Iterator<Item = Rank> {
        (self.low.value()..=self.high.value()).filter_map(Rank::from_value)
    }

    fn extend(&mut self, rank: Rank) {
        if rank < self.low {
            self.low = rank;
        } else if rank > self.high {
            self.high = rank;
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    NotPlayable(Card),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::NotPlayable(card) => {
                write!(f, "{card} does not extend any run on the table")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Cards laid out on the table, one run per suit at most.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableState {
    runs: [Option<Run>; 4],
}

impl TableState {
    pub const fn new() -> Self {
        Self { runs: [None; 4] }
    }

    pub fn run(&self, suit: Suit) -> Option<Run> {
        self.runs[suit.index()]
    }

    pub fn is_open(&self, suit: Suit) -> bool {
        self.runs[suit.index()].is_some()
    }

    pub fn runs(&self) -> [Option<Run>; 4] {
        self.runs
    }

    pub fn iter(&self) -> impl Iterator<Item = (Suit, Run)> + '_ {
        Suit::ALL
            .iter()
            .copied()
            .filter_map(|suit| self.run(suit).map(|run| (suit, run)))
    }

    pub fn cards_on_table(&self) -> usize {
        self.iter().map(|(_, run)| run.len()).sum()
    }

    /// Cards of one suit's run, lowest first.
    pub fn cards(&self, suit: Suit) -> Vec<Card> {
        self.run(suit)
            .map(|run| run.ranks().map(|rank| Card::new(rank, suit)).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Option::is_none)
    }

    /// Lays `card` on the table and returns the suit's updated run.
    pub fn place(&mut self, card: Card) -> Result<Run, PlacementError> {
        if !validator::is_playable(self, card) {
            return Err(PlacementError::NotPlayable(card));
        }
        let index = card.suit.index();
        let run = match self.runs[index] {
            Some(mut run) => {
                run.extend(card.rank);
                run
            }
            None => Run::single(card.rank),
        };
        self.runs[index] = Some(run);
        Ok(run)
    }
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty table)");
        }
        for (i, (suit, _)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            let cards: Vec<String> = self.cards(suit).iter().map(Card::to_string).collect();
            write!(f, "{}: {}", suit.name(), cards.join(" "))?;
        }
        Ok(())
    }
}
