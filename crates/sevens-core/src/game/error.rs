use crate::model::card::Card;
use crate::model::player::PlayerId;
use thiserror::Error;

/// Why a requested play was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    NotInHand(Card),
    NotPlayable(Card),
    IndexOutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalReason::NotInHand(card) => write!(f, "{card} is not in hand"),
            IllegalReason::NotPlayable(card) => write!(f, "{card} cannot be played now"),
            IllegalReason::IndexOutOfRange { index, len } => {
                write!(f, "card index {index} is outside a hand of {len}")
            }
        }
    }
}

/// Recoverable engine errors. None of them changes game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("a game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("illegal move by {player}: {reason}")]
    IllegalMove {
        player: PlayerId,
        reason: IllegalReason,
    },
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotCurrentPlayer {
        expected: PlayerId,
        actual: PlayerId,
    },
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("cards have not been dealt yet")]
    NotDealt,
    #[error("cards have already been dealt")]
    AlreadyDealt,
    #[error("{0} is not seated at this table")]
    UnknownPlayer(PlayerId),
    #[error("{0} appears in more than one hand")]
    DuplicateCard(Card),
    #[error("{0} was given no cards")]
    EmptyHand(PlayerId),
}

impl GameError {
    /// True for errors a collaborator can fix by choosing again.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GameError::IllegalMove { .. } | GameError::NotCurrentPlayer { .. }
        )
    }
}
