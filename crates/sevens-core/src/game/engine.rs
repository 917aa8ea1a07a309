use crate::game::error::{GameError, IllegalReason};
use crate::game::outcome::{EndReason, GameResult, TurnOutcome, Winner};
use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::hand::Hand;
use crate::model::player::PlayerId;
use crate::model::table::{Run, TableState};
use crate::rules::validator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use tracing::{debug, info};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingDeal,
    InProgress,
    Finished(GameResult),
}

/// One round of Sevens: hands, table, turn order and termination.
///
/// Every mutating call either applies its whole effect or returns an error
/// and leaves the engine untouched.
#[derive(Debug, Clone)]
pub struct GameEngine {
    hands: Vec<Hand>,
    passes: Vec<u32>,
    table: TableState,
    deck: Deck,
    current: PlayerId,
    phase: GamePhase,
    turns: u32,
    rng: StdRng,
    seed: u64,
}

impl GameEngine {
    pub fn new(player_count: usize) -> Result<Self, GameError> {
        let seed: u64 = rand::random();
        Self::with_seed(player_count, seed)
    }

    pub fn with_seed(player_count: usize, seed: u64) -> Result<Self, GameError> {
        validate_player_count(player_count)?;
        Ok(Self {
            hands: vec![Hand::new(); player_count],
            passes: vec![0; player_count],
            table: TableState::new(),
            deck: Deck::standard(),
            current: PlayerId::new(0),
            phase: GamePhase::AwaitingDeal,
            turns: 0,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    /// Starts a game from hands chosen by the caller. Cards not held by
    /// anyone stay in the deck. Every player must hold at least one card.
    pub fn from_hands(hands: Vec<Hand>) -> Result<Self, GameError> {
        validate_player_count(hands.len())?;
        if let Some(seat) = hands.iter().position(Hand::is_empty) {
            let player =
                PlayerId::from_index(seat).ok_or(GameError::InvalidPlayerCount(hands.len()))?;
            return Err(GameError::EmptyHand(player));
        }

        let mut seen = HashSet::new();
        for card in hands.iter().flat_map(|hand| hand.iter()) {
            if !seen.insert(*card) {
                return Err(GameError::DuplicateCard(*card));
            }
        }
        let dealt: Vec<Card> = seen.into_iter().collect();

        let player_count = hands.len();
        Ok(Self {
            hands,
            passes: vec![0; player_count],
            table: TableState::new(),
            deck: Deck::without(&dealt),
            current: PlayerId::new(0),
            phase: GamePhase::InProgress,
            turns: 0,
            rng: StdRng::seed_from_u64(0),
            seed: 0,
        })
    }

    /// Shuffles the deck and hands `36 / player_count` cards to each player
    /// in seat order.
    pub fn deal(&mut self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::AwaitingDeal => {}
            GamePhase::InProgress => return Err(GameError::AlreadyDealt),
            GamePhase::Finished(_) => return Err(GameError::GameAlreadyOver),
        }

        self.deck.shuffle_in_place(&mut self.rng);
        let per_player = DECK_SIZE / self.hands.len();
        for hand in &mut self.hands {
            hand.extend(self.deck.deal(per_player));
        }
        self.phase = GamePhase::InProgress;

        debug!(
            players = self.hands.len(),
            per_player,
            undealt = self.deck.remaining(),
            seed = self.seed,
            "cards dealt"
        );
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Finished(_))
    }

    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    pub fn turns_played(&self) -> u32 {
        self.turns
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn table_snapshot(&self) -> [Option<Run>; 4] {
        self.table.runs()
    }

    pub fn hand(&self, player: PlayerId) -> Result<&Hand, GameError> {
        self.hands
            .get(player.index())
            .ok_or(GameError::UnknownPlayer(player))
    }

    pub fn hand_snapshot(&self, player: PlayerId) -> Result<Vec<Card>, GameError> {
        Ok(self.hand(player)?.cards().to_vec())
    }

    pub fn hand_sizes(&self) -> Vec<usize> {
        self.hands.iter().map(Hand::len).collect()
    }

    pub fn pass_count(&self, player: PlayerId) -> Result<u32, GameError> {
        self.passes
            .get(player.index())
            .copied()
            .ok_or(GameError::UnknownPlayer(player))
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// Deck, hands and table together. Always equals the deck size.
    pub fn cards_accounted(&self) -> usize {
        self.deck.remaining()
            + self.hands.iter().map(Hand::len).sum::<usize>()
            + self.table.cards_on_table()
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.result().map(|result| &result.winner)
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            GamePhase::Finished(result) => Some(result),
            _ => None,
        }
    }

    pub fn legal_moves(&self, player: PlayerId) -> Result<Vec<Card>, GameError> {
        Ok(validator::legal_moves(self.hand(player)?, &self.table))
    }

    pub fn legal_indices(&self, player: PlayerId) -> Result<Vec<usize>, GameError> {
        Ok(validator::legal_indices(self.hand(player)?, &self.table))
    }

    /// Whether `player` holds `card` and it fits the table. Turn order is
    /// not considered.
    pub fn is_legal_move(&self, player: PlayerId, card: Card) -> bool {
        self.hand(player)
            .map(|hand| hand.contains(card) && validator::is_playable(&self.table, card))
            .unwrap_or(false)
    }

    pub fn apply_move(&mut self, player: PlayerId, card: Card) -> Result<TurnOutcome, GameError> {
        self.ensure_turn(player)?;

        let seat = player.index();
        if !self.hands[seat].contains(card) {
            return Err(illegal(player, IllegalReason::NotInHand(card)));
        }
        let run = self
            .table
            .place(card)
            .map_err(|_| illegal(player, IllegalReason::NotPlayable(card)))?;

        let removed = self.hands[seat].remove(card);
        debug_assert!(removed, "{card} was checked to be in hand");
        self.passes[seat] = 0;
        self.turns += 1;
        debug!(%player, %card, %run, left = self.hands[seat].len(), "card played");

        if self.hands[seat].is_empty() {
            return Ok(self.finish(Winner::Sole(player), EndReason::HandEmptied));
        }

        self.current = player.next(self.player_count());
        Ok(TurnOutcome::Played {
            player,
            card,
            run,
            next: self.current,
        })
    }

    /// Plays the card at `index` in the player's sorted hand.
    pub fn play_index(&mut self, player: PlayerId, index: usize) -> Result<TurnOutcome, GameError> {
        self.ensure_turn(player)?;
        let hand = &self.hands[player.index()];
        let card = hand.get(index).ok_or_else(|| {
            illegal(
                player,
                IllegalReason::IndexOutOfRange {
                    index,
                    len: hand.len(),
                },
            )
        })?;
        self.apply_move(player, card)
    }

    pub fn pass(&mut self, player: PlayerId) -> Result<TurnOutcome, GameError> {
        self.ensure_turn(player)?;

        let seat = player.index();
        self.passes[seat] += 1;
        self.turns += 1;
        debug!(%player, passes = self.passes[seat], "turn passed");

        // A counter is only cleared by its owner's own play, so this can end
        // the round even if someone who passed earlier could now move.
        if self.passes.iter().all(|&count| count > 0) {
            let winner = Winner::fewest_cards(&self.hand_sizes());
            return Ok(self.finish(winner, EndReason::Lockout));
        }

        self.current = player.next(self.player_count());
        Ok(TurnOutcome::Passed {
            player,
            next: self.current,
        })
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Finished(_) => return Err(GameError::GameAlreadyOver),
            GamePhase::AwaitingDeal => return Err(GameError::NotDealt),
            GamePhase::InProgress => {}
        }
        if player.index() >= self.player_count() {
            return Err(GameError::UnknownPlayer(player));
        }
        if player != self.current {
            return Err(GameError::NotCurrentPlayer {
                expected: self.current,
                actual: player,
            });
        }
        Ok(())
    }

    fn finish(&mut self, winner: Winner, reason: EndReason) -> TurnOutcome {
        let result = GameResult {
            winner,
            reason,
            cards_left: self.hand_sizes(),
        };
        info!(
            winner = %result.winner,
            reason = reason.as_str(),
            turns = self.turns,
            "game over"
        );
        self.phase = GamePhase::Finished(result.clone());
        TurnOutcome::GameOver(result)
    }
}

fn validate_player_count(count: usize) -> Result<(), GameError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        Ok(())
    } else {
        Err(GameError::InvalidPlayerCount(count))
    }
}

fn illegal(player: PlayerId, reason: IllegalReason) -> GameError {
    GameError::IllegalMove { player, reason }
}

#[cfg(test)]
mod tests {
    use super::{GameEngine, GamePhase};
    use crate::game::error::{GameError, IllegalReason};
    use crate::game::outcome::{EndReason, TurnOutcome, Winner};
    use crate::model::card::Card;
    use crate::model::deck::DECK_SIZE;
    use crate::model::hand::Hand;
    use crate::model::player::PlayerId;

    const P1: PlayerId = PlayerId::new(0);
    const P2: PlayerId = PlayerId::new(1);
    const P3: PlayerId = PlayerId::new(2);

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse().unwrap()).collect())
    }

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    #[test]
    fn player_count_is_bounded() {
        assert_eq!(
            GameEngine::with_seed(1, 0).unwrap_err(),
            GameError::InvalidPlayerCount(1)
        );
        assert_eq!(
            GameEngine::with_seed(5, 0).unwrap_err(),
            GameError::InvalidPlayerCount(5)
        );
        for count in 2..=4 {
            assert!(GameEngine::with_seed(count, 0).is_ok());
        }
    }

    #[test]
    fn dealing_splits_the_deck_evenly() {
        for count in 2..=4 {
            let mut engine = GameEngine::with_seed(count, 7).unwrap();
            engine.deal().unwrap();
            assert!(engine.hand_sizes().iter().all(|&n| n == DECK_SIZE / count));
            assert_eq!(engine.deck_remaining(), 0);
            assert_eq!(engine.cards_accounted(), DECK_SIZE);
            assert_eq!(engine.current_player(), P1);
        }
    }

    #[test]
    fn dealing_twice_is_rejected() {
        let mut engine = GameEngine::with_seed(3, 1).unwrap();
        engine.deal().unwrap();
        let before = engine.hand_sizes();
        assert_eq!(engine.deal(), Err(GameError::AlreadyDealt));
        assert_eq!(engine.hand_sizes(), before);
    }

    #[test]
    fn same_seed_deals_same_hands() {
        let mut a = GameEngine::with_seed(2, 99).unwrap();
        let mut b = GameEngine::with_seed(2, 99).unwrap();
        a.deal().unwrap();
        b.deal().unwrap();
        assert_eq!(a.hand_snapshot(P1), b.hand_snapshot(P1));
        assert_eq!(a.hand_snapshot(P2), b.hand_snapshot(P2));
    }

    #[test]
    fn actions_before_deal_are_rejected() {
        let mut engine = GameEngine::with_seed(2, 0).unwrap();
        assert_eq!(engine.pass(P1), Err(GameError::NotDealt));
        assert_eq!(engine.apply_move(P1, card("7H")), Err(GameError::NotDealt));
        assert_eq!(engine.cards_accounted(), DECK_SIZE);
    }

    #[test]
    fn out_of_turn_actions_change_nothing() {
        let mut engine = GameEngine::from_hands(vec![hand(&["7H"]), hand(&["8H"])]).unwrap();
        assert_eq!(
            engine.pass(P2),
            Err(GameError::NotCurrentPlayer {
                expected: P1,
                actual: P2
            })
        );
        assert_eq!(engine.pass_count(P2), Ok(0));
        assert_eq!(engine.turns_played(), 0);
        assert_eq!(
            engine.apply_move(PlayerId::new(3), card("7H")),
            Err(GameError::UnknownPlayer(PlayerId::new(3)))
        );
    }

    #[test]
    fn illegal_cards_are_rejected_without_mutation() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["7H", "9H"]), hand(&["8H", "7S"])]).unwrap();

        assert_eq!(
            engine.apply_move(P1, card("9H")),
            Err(GameError::IllegalMove {
                player: P1,
                reason: IllegalReason::NotPlayable(card("9H"))
            })
        );
        assert_eq!(
            engine.apply_move(P1, card("7S")),
            Err(GameError::IllegalMove {
                player: P1,
                reason: IllegalReason::NotInHand(card("7S"))
            })
        );
        assert_eq!(
            engine.play_index(P1, 5),
            Err(GameError::IllegalMove {
                player: P1,
                reason: IllegalReason::IndexOutOfRange { index: 5, len: 2 }
            })
        );

        assert!(engine.table().is_empty());
        assert_eq!(engine.hand_sizes(), vec![2, 2]);
        assert_eq!(engine.current_player(), P1);
    }

    #[test]
    fn play_extends_table_and_rotates_turn() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["7H", "9H"]), hand(&["8H", "6H"])]).unwrap();

        let outcome = engine.play_index(P1, 0).unwrap();
        assert!(matches!(
            outcome,
            TurnOutcome::Played { player, next, .. } if player == P1 && next == P2
        ));
        assert_eq!(engine.legal_moves(P2).unwrap(), vec![card("6H"), card("8H")]);

        engine.apply_move(P2, card("8H")).unwrap();
        assert_eq!(engine.legal_moves(P1).unwrap(), vec![card("9H")]);
        assert_eq!(engine.cards_accounted(), DECK_SIZE);
    }

    #[test]
    fn emptying_a_hand_wins_immediately() {
        let mut engine = GameEngine::from_hands(vec![
            hand(&["7D"]),
            hand(&["6S"]),
            hand(&["8S", "9S", "10S"]),
        ])
        .unwrap();

        match engine.apply_move(P1, card("7D")).unwrap() {
            TurnOutcome::GameOver(result) => {
                assert_eq!(result.winner, Winner::Sole(P1));
                assert_eq!(result.reason, EndReason::HandEmptied);
                assert_eq!(result.cards_left, vec![0, 1, 3]);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
        assert_eq!(engine.winner(), Some(&Winner::Sole(P1)));
        assert_eq!(engine.pass(P2), Err(GameError::GameAlreadyOver));
        assert_eq!(engine.deal(), Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn finished_game_refuses_every_play() {
        let mut engine = GameEngine::from_hands(vec![hand(&["7D"]), hand(&["8D", "9D"])]).unwrap();
        engine.apply_move(P1, card("7D")).unwrap();
        let table = *engine.table();
        let sizes = engine.hand_sizes();
        let turns = engine.turns_played();

        assert_eq!(
            engine.apply_move(P2, card("8D")),
            Err(GameError::GameAlreadyOver)
        );
        assert_eq!(engine.play_index(P2, 0), Err(GameError::GameAlreadyOver));
        assert_eq!(*engine.table(), table);
        assert_eq!(engine.hand_sizes(), sizes);
        assert_eq!(engine.turns_played(), turns);
        assert_eq!(engine.winner(), Some(&Winner::Sole(P1)));
    }

    #[test]
    fn two_consecutive_passes_end_a_two_player_game() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["10H", "JH"]), hand(&["QH", "KH", "AH"])]).unwrap();

        assert!(matches!(engine.pass(P1), Ok(TurnOutcome::Passed { .. })));
        assert!(engine.winner().is_none());
        let outcome = engine.pass(P2).unwrap();
        let TurnOutcome::GameOver(result) = outcome else {
            panic!("expected lockout");
        };
        assert_eq!(result.reason, EndReason::Lockout);
        assert_eq!(result.winner, Winner::Sole(P1));
    }

    #[test]
    fn lockout_with_equal_counts_is_a_tie() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["10H", "JH"]), hand(&["QH", "KH"])]).unwrap();
        engine.pass(P1).unwrap();
        engine.pass(P2).unwrap();
        assert_eq!(engine.winner(), Some(&Winner::Tie(vec![P1, P2])));
    }

    #[test]
    fn a_play_only_clears_the_players_own_counter() {
        let mut engine = GameEngine::from_hands(vec![
            hand(&["6D", "9C"]),
            hand(&["7H", "AS"]),
            hand(&["KD", "KC"]),
        ])
        .unwrap();

        engine.pass(P1).unwrap();
        engine.apply_move(P2, card("7H")).unwrap();
        engine.pass(P3).unwrap();
        engine.pass(P1).unwrap();
        assert!(!engine.is_over());
        assert_eq!(engine.pass_count(P1), Ok(2));
        assert_eq!(engine.pass_count(P2), Ok(0));

        engine.pass(P2).unwrap();
        let result = engine.result().expect("locked out");
        assert_eq!(result.reason, EndReason::Lockout);
        assert_eq!(result.winner, Winner::Sole(P2));
        assert!(matches!(engine.phase(), GamePhase::Finished(_)));
    }

    #[test]
    fn duplicate_cards_across_hands_are_rejected() {
        let err = GameEngine::from_hands(vec![hand(&["7H"]), hand(&["7H"])]).unwrap_err();
        assert_eq!(err, GameError::DuplicateCard(card("7H")));
    }

    #[test]
    fn empty_hands_are_rejected() {
        let err = GameEngine::from_hands(vec![hand(&["7H"]), Hand::new()]).unwrap_err();
        assert_eq!(err, GameError::EmptyHand(P2));

        let err = GameEngine::from_hands(vec![Hand::new(), hand(&["7H"]), Hand::new()])
            .unwrap_err();
        assert_eq!(err, GameError::EmptyHand(P1));
    }

    #[test]
    fn legality_query_ignores_turn_but_not_ownership() {
        let engine = GameEngine::from_hands(vec![hand(&["7H"]), hand(&["7S"])]).unwrap();
        assert!(engine.is_legal_move(P2, card("7S")));
        assert!(!engine.is_legal_move(P2, card("7H")));
        assert!(!engine.is_legal_move(PlayerId::new(3), card("7H")));
    }
}
