use super::engine::GameEngine;
use super::outcome::GameResult;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// Public view of a game: what every collaborator is allowed to see.
/// Hands are reduced to their sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub player_count: usize,
    pub current_player: PlayerId,
    pub turns: u32,
    pub hand_sizes: Vec<usize>,
    pub pass_counts: Vec<u32>,
    pub table: Vec<SuitRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuitRun {
    pub suit: Suit,
    pub low: Rank,
    pub high: Rank,
    pub cards: Vec<Card>,
}

impl GameSnapshot {
    pub fn capture(engine: &GameEngine) -> Self {
        let table = engine.table();
        let pass_counts = PlayerId::seats(engine.player_count())
            .map(|player| engine.pass_count(player).unwrap_or_default())
            .collect();

        GameSnapshot {
            seed: engine.seed(),
            player_count: engine.player_count(),
            current_player: engine.current_player(),
            turns: engine.turns_played(),
            hand_sizes: engine.hand_sizes(),
            pass_counts,
            table: table
                .iter()
                .map(|(suit, run)| SuitRun {
                    suit,
                    low: run.low,
                    high: run.high,
                    cards: table.cards(suit),
                })
                .collect(),
            result: engine.result().cloned(),
        }
    }

    pub fn to_json(engine: &GameEngine) -> serde_json::Result<String> {
        let snapshot = Self::capture(engine);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
