pub mod driver;
pub mod policy;

pub use driver::{DriverConfig, DriverError, GameRecord, SeatStats, Turn, play_out};
pub use policy::{
    BotKind, Decision, GreedyPolicy, HumanPolicy, Policy, PolicyContext, RandomPolicy,
};
