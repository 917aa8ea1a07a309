use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::table::Run;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Sole(PlayerId),
    /// Several players share the fewest remaining cards.
    Tie(Vec<PlayerId>),
}

impl Winner {
    pub fn players(&self) -> &[PlayerId] {
        match self {
            Winner::Sole(player) => std::slice::from_ref(player),
            Winner::Tie(players) => players,
        }
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players().contains(&player)
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Winner::Tie(_))
    }

    /// Everyone holding the minimum card count wins.
    pub(crate) fn fewest_cards(hand_sizes: &[usize]) -> Self {
        let fewest = hand_sizes.iter().copied().min().unwrap_or(0);
        let mut players: Vec<PlayerId> = hand_sizes
            .iter()
            .enumerate()
            .filter(|&(_, &size)| size == fewest)
            .filter_map(|(index, _)| PlayerId::from_index(index))
            .collect();
        if players.len() == 1 {
            Winner::Sole(players.remove(0))
        } else {
            Winner::Tie(players)
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Sole(player) => write!(f, "{player} wins"),
            Winner::Tie(players) => {
                let names: Vec<String> = players.iter().map(PlayerId::to_string).collect();
                write!(f, "tie between {}", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    HandEmptied,
    /// Every player passed on their latest turn.
    Lockout,
}

impl EndReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            EndReason::HandEmptied => "hand_emptied",
            EndReason::Lockout => "lockout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Winner,
    pub reason: EndReason,
    pub cards_left: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Played {
        player: PlayerId,
        card: Card,
        run: Run,
        next: PlayerId,
    },
    Passed {
        player: PlayerId,
        next: PlayerId,
    },
    GameOver(GameResult),
}
