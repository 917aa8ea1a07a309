mod greedy;
mod human;
mod random;

pub use greedy::GreedyPolicy;
pub use human::HumanPolicy;
pub use random::RandomPolicy;

use sevens_core::game::error::GameError;
use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;
use sevens_core::model::player::PlayerId;
use sevens_core::model::table::TableState;
use std::fmt;
use std::str::FromStr;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: PlayerId,
    pub hand: &'a Hand,
    pub table: &'a TableState,
    /// Playable cards, in hand order. Empty means the seat must pass.
    pub legal: &'a [Card],
    pub hand_sizes: &'a [usize],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Play(Card),
    Pass,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Play(card) => write!(f, "play {card}"),
            Decision::Pass => f.write_str("pass"),
        }
    }
}

impl FromStr for Decision {
    type Err = sevens_core::model::card::ParseCardError;

    /// `pass` (or `0`, as prompted by a console) passes; anything else must
    /// name a card.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "p" | "0" => Ok(Decision::Pass),
            other => other.parse().map(Decision::Play),
        }
    }
}

/// How a seat chooses its move. The driver only depends on this trait, so
/// new strategies plug in without touching turn logic.
pub trait Policy: Send {
    fn name(&self) -> &str;

    /// Choose a card from `ctx.legal` or pass.
    fn choose(&mut self, ctx: &PolicyContext) -> Decision;

    /// Called when the engine refused the previous decision; the same turn
    /// is offered again afterwards.
    fn on_rejected(&mut self, _ctx: &PolicyContext, _error: &GameError) {}
}

/// Built-in automated strategies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotKind {
    #[default]
    Random,
    Greedy,
}

impl BotKind {
    pub fn spawn(self, seed: Option<u64>) -> Box<dyn Policy> {
        match self {
            BotKind::Random => Box::new(RandomPolicy::new(seed)),
            BotKind::Greedy => Box::new(GreedyPolicy::new()),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotKind::Random => "random",
            BotKind::Greedy => "greedy",
        }
    }
}

impl FromStr for BotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(BotKind::Random),
            "greedy" | "normal" => Ok(BotKind::Greedy),
            other => Err(format!("unknown bot kind '{other}'")),
        }
    }
}
