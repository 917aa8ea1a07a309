use super::{Decision, Policy, PolicyContext};
use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;
use sevens_core::model::rank::Rank;
use tracing::{Level, event};

/// Prefers the card that unlocks the most of its own hand.
///
/// A card's score is the number of same-suit cards the seat holds beyond it
/// in the direction the run grows. Sevens open both directions. Ties keep
/// hand order.
#[derive(Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

fn unlocked_by(card: Card, hand: &Hand) -> usize {
    hand.iter()
        .filter(|other| other.suit == card.suit && **other != card)
        .filter(|other| match card.rank {
            Rank::Seven => true,
            rank if rank < Rank::Seven => other.rank < rank,
            rank => other.rank > rank,
        })
        .count()
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Decision {
        let mut best: Option<(Card, usize)> = None;
        for &card in ctx.legal {
            let score = unlocked_by(card, ctx.hand);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((card, score));
            }
        }

        match best {
            Some((card, score)) => {
                event!(
                    target: "sevens_bot::greedy",
                    Level::TRACE,
                    seat = %ctx.seat,
                    %card,
                    score,
                );
                Decision::Play(card)
            }
            None => Decision::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GreedyPolicy, unlocked_by};
    use crate::policy::{Decision, Policy, PolicyContext};
    use sevens_core::model::card::Card;
    use sevens_core::model::hand::Hand;
    use sevens_core::model::player::PlayerId;
    use sevens_core::model::table::TableState;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    fn hand(list: &[&str]) -> Hand {
        Hand::with_cards(list.iter().map(|c| card(c)).collect())
    }

    #[test]
    fn scores_count_cards_beyond_in_run_direction() {
        let held = hand(&["7S", "6S", "8S", "9S", "AS", "6H"]);
        assert_eq!(unlocked_by(card("7S"), &held), 4);
        assert_eq!(unlocked_by(card("8S"), &held), 2);
        assert_eq!(unlocked_by(card("6S"), &held), 0);
    }

    #[test]
    fn picks_the_seven_that_frees_the_longest_suit() {
        let held = hand(&["7H", "8H", "7C", "8C", "9C", "10C"]);
        let legal = vec![card("7H"), card("7C")];
        let table = TableState::new();
        let sizes = [6, 6];
        let ctx = PolicyContext {
            seat: PlayerId::new(0),
            hand: &held,
            table: &table,
            legal: &legal,
            hand_sizes: &sizes,
        };
        assert_eq!(GreedyPolicy::new().choose(&ctx), Decision::Play(card("7C")));
    }

    #[test]
    fn ties_keep_hand_order_and_blocked_seats_pass() {
        let held = hand(&["7H", "7D"]);
        let legal = held.cards().to_vec();
        let table = TableState::new();
        let sizes = [2, 2];
        let mut ctx = PolicyContext {
            seat: PlayerId::new(0),
            hand: &held,
            table: &table,
            legal: &legal,
            hand_sizes: &sizes,
        };
        let mut policy = GreedyPolicy::new();
        assert_eq!(policy.choose(&ctx), Decision::Play(legal[0]));

        ctx.legal = &[];
        assert_eq!(policy.choose(&ctx), Decision::Pass);
    }
}
