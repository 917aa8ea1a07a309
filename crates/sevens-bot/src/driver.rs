use crate::policy::{Decision, Policy, PolicyContext};
use sevens_core::game::engine::{GameEngine, GamePhase};
use sevens_core::game::error::GameError;
use sevens_core::game::outcome::{GameResult, TurnOutcome};
use sevens_core::model::player::PlayerId;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Consecutive refusals tolerated from one seat before giving up.
    pub max_rejections: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_rejections: 8 }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{actual} policies were supplied for a {expected}-player game")]
    SeatCount { expected: usize, actual: usize },
    #[error(transparent)]
    Engine(#[from] GameError),
    #[error("{player} was refused {attempts} times in a row")]
    TooManyRejections { player: PlayerId, attempts: u32 },
}

/// Per-seat tallies gathered while a game runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatStats {
    pub plays: u32,
    pub passes: u32,
    pub rejections: u32,
    /// Every call to `Policy::choose`, refused ones included.
    pub decisions: u32,
    pub thinking: Duration,
}

impl SeatStats {
    pub fn average_decision(&self) -> Duration {
        if self.decisions == 0 {
            Duration::ZERO
        } else {
            self.thinking / self.decisions
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub player: PlayerId,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub seed: u64,
    pub result: GameResult,
    pub turns: Vec<Turn>,
    pub seats: Vec<SeatStats>,
}

impl GameRecord {
    pub fn plays(&self) -> u32 {
        self.seats.iter().map(|s| s.plays).sum()
    }

    pub fn passes(&self) -> u32 {
        self.seats.iter().map(|s| s.passes).sum()
    }

    pub fn rejections(&self) -> u32 {
        self.seats.iter().map(|s| s.rejections).sum()
    }
}

/// Runs `engine` to completion, asking the policy in each seat for its move.
///
/// Seat `i` plays as `PlayerId(i)`. A refused decision is reported back to
/// the policy and the same turn is offered again.
pub fn play_out(
    engine: &mut GameEngine,
    seats: &mut [Box<dyn Policy>],
    config: &DriverConfig,
) -> Result<GameRecord, DriverError> {
    if seats.len() != engine.player_count() {
        return Err(DriverError::SeatCount {
            expected: engine.player_count(),
            actual: seats.len(),
        });
    }
    if matches!(engine.phase(), GamePhase::AwaitingDeal) {
        engine.deal()?;
    }

    let mut stats = vec![SeatStats::default(); seats.len()];
    let mut turns = Vec::new();

    while !engine.is_over() {
        let player = engine.current_player();
        let seat = player.index();
        let policy = &mut seats[seat];
        let legal = engine.legal_moves(player)?;
        let sizes = engine.hand_sizes();
        let mut attempts = 0;

        loop {
            let ctx = PolicyContext {
                seat: player,
                hand: engine.hand(player)?,
                table: engine.table(),
                legal: &legal,
                hand_sizes: &sizes,
            };
            let started = Instant::now();
            let decision = policy.choose(&ctx);
            stats[seat].thinking += started.elapsed();
            stats[seat].decisions += 1;

            let applied = match decision {
                Decision::Play(card) => engine.apply_move(player, card),
                Decision::Pass => engine.pass(player),
            };

            match applied {
                Ok(outcome) => {
                    match decision {
                        Decision::Play(_) => stats[seat].plays += 1,
                        Decision::Pass => stats[seat].passes += 1,
                    }
                    turns.push(Turn { player, decision });
                    debug!(policy = policy.name(), %player, %decision, "turn applied");
                    if let TurnOutcome::GameOver(result) = outcome {
                        info!(
                            winner = %result.winner,
                            turns = turns.len(),
                            "driver finished game"
                        );
                    }
                    break;
                }
                Err(err) if err.is_rejection() => {
                    attempts += 1;
                    stats[seat].rejections += 1;
                    warn!(policy = policy.name(), %player, %decision, error = %err, attempts, "decision refused");

                    let ctx = PolicyContext {
                        seat: player,
                        hand: engine.hand(player)?,
                        table: engine.table(),
                        legal: &legal,
                        hand_sizes: &sizes,
                    };
                    policy.on_rejected(&ctx, &err);
                    if attempts >= config.max_rejections {
                        return Err(DriverError::TooManyRejections { player, attempts });
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    let result = engine.result().cloned().ok_or(GameError::NotDealt)?;
    Ok(GameRecord {
        seed: engine.seed(),
        result,
        turns,
        seats: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::{DriverConfig, DriverError, play_out};
    use crate::policy::{Decision, GreedyPolicy, HumanPolicy, Policy, RandomPolicy};
    use sevens_core::game::engine::GameEngine;
    use sevens_core::game::outcome::{EndReason, Winner};
    use sevens_core::model::hand::Hand;
    use sevens_core::model::player::PlayerId;

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse().unwrap()).collect())
    }

    #[test]
    fn deals_and_finishes_a_game() {
        let mut engine = GameEngine::with_seed(3, 11).unwrap();
        let mut seats: Vec<Box<dyn Policy>> = vec![
            Box::new(RandomPolicy::new(Some(1))),
            Box::new(GreedyPolicy::new()),
            Box::new(RandomPolicy::new(Some(2))),
        ];
        let record = play_out(&mut engine, &mut seats, &DriverConfig::default()).unwrap();

        assert!(engine.is_over());
        assert_eq!(record.seed, 11);
        assert_eq!(record.rejections(), 0);
        assert_eq!(record.turns.len() as u32, engine.turns_played());
        assert_eq!(record.plays() + record.passes(), engine.turns_played());
    }

    #[test]
    fn mismatched_seat_count_is_refused() {
        let mut engine = GameEngine::with_seed(4, 1).unwrap();
        let mut seats: Vec<Box<dyn Policy>> = vec![Box::new(GreedyPolicy::new())];
        let err = play_out(&mut engine, &mut seats, &DriverConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::SeatCount {
                expected: 4,
                actual: 1
            }
        ));
    }

    #[test]
    fn refused_decisions_are_offered_again() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["7H", "AS"]), hand(&["KD", "QD"])]).unwrap();
        let mut answers = vec![
            Decision::Play("7H".parse().unwrap()),
            Decision::Play("AS".parse().unwrap()),
        ];
        let mut seats: Vec<Box<dyn Policy>> = vec![
            Box::new(HumanPolicy::new("scripted", move |_ctx| {
                answers.pop().unwrap_or(Decision::Pass)
            })),
            Box::new(GreedyPolicy::new()),
        ];
        let record = play_out(&mut engine, &mut seats, &DriverConfig::default()).unwrap();

        assert_eq!(record.seats[0].rejections, 1);
        assert_eq!(record.seats[0].decisions, record.seats[0].rejections + 2);
        assert_eq!(record.result.reason, EndReason::Lockout);
        assert_eq!(record.result.winner, Winner::Sole(PlayerId::new(0)));
    }

    #[test]
    fn stubborn_policy_exhausts_the_retry_limit() {
        let mut engine =
            GameEngine::from_hands(vec![hand(&["AS"]), hand(&["7H"])]).unwrap();
        let mut seats: Vec<Box<dyn Policy>> = vec![
            Box::new(HumanPolicy::new("stubborn", |_ctx| {
                Decision::Play("AS".parse().unwrap())
            })),
            Box::new(GreedyPolicy::new()),
        ];
        let config = DriverConfig { max_rejections: 3 };
        let err = play_out(&mut engine, &mut seats, &config).unwrap_err();
        assert!(matches!(
            err,
            DriverError::TooManyRejections { attempts: 3, .. }
        ));
        assert_eq!(engine.turns_played(), 0);
    }
}
