//! Move legality. A card may be played when it is the seven of a suit not
//! yet on the table, or when it sits directly below or above that suit's
//! run. Everything here is a pure function of the hand and table passed in.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::table::TableState;

pub fn is_playable(table: &TableState, card: Card) -> bool {
    match table.run(card.suit) {
        None => card.rank == Rank::Seven,
        Some(run) => run.is_adjacent(card.rank),
    }
}

/// Playable cards in hand order.
pub fn legal_moves(hand: &Hand, table: &TableState) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|&card| is_playable(table, card))
        .collect()
}

/// Positions of the playable cards within `hand`.
pub fn legal_indices(hand: &Hand, table: &TableState) -> Vec<usize> {
    hand.iter()
        .enumerate()
        .filter(|(_, card)| is_playable(table, **card))
        .map(|(index, _)| index)
        .collect()
}

pub fn has_legal_move(hand: &Hand, table: &TableState) -> bool {
    hand.iter().any(|&card| is_playable(table, card))
}
