mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use sevens_bot::{BotKind, DriverConfig, DriverError, GameRecord, Policy, SeatStats, play_out};
use sevens_core::game::engine::{GameEngine, MAX_PLAYERS, MIN_PLAYERS};
use sevens_core::game::error::GameError;
use sevens_core::game::outcome::EndReason;
use sevens_core::model::player::PlayerId;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::AnalyticsCollector;
use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs};
use crate::logging;

pub use permutations::{SeatPermutations, max_permutations};

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
    driver: DriverConfig,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&agents.len()) {
            return Err(GameError::InvalidPlayerCount(agents.len()).into());
        }

        let max = max_permutations(agents.len());
        if config.games.permutations > max {
            return Err(RunnerError::PermutationLimit {
                requested: config.games.permutations,
                max,
            });
        }

        let seat_permutations = SeatPermutations::new(agents.len(), config.games.permutations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            driver: DriverConfig {
                max_rejections: config.games.max_rejections,
            },
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let outcome = self.play_game(game_index, perm_index, base_seed, perm)?;
                analytics.record_game(&outcome)?;
                rows_written += write_game_rows(&mut writer, &self.config, &outcome)?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| logging::telemetry_path(&self.outputs));

        Ok(RunSummary {
            games_played: self.config.games.count,
            permutations: permutations.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize],
    ) -> Result<GameOutcome, RunnerError> {
        let game_id = format!("G{game_index:05}_P{permutation_index:02}");
        let (seats, mut policies) = build_seats(permutation, &self.agents, base_seed)?;
        let mut engine = GameEngine::with_seed(seats.len(), base_seed)?;
        let record = play_out(&mut engine, &mut policies, &self.driver).map_err(|source| {
            RunnerError::Game {
                game_id: game_id.clone(),
                source,
            }
        })?;

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "sevens_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_id = %game_id,
                winner = %record.result.winner,
                reason = record.result.reason.as_str(),
                turns = record.turns.len(),
                rejections = record.rejections(),
            );
        }

        Ok(GameOutcome::from_record(
            game_id,
            game_index,
            permutation_index,
            &seats,
            &record,
        ))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = GameLogRow {
            run_id: &config.run_id,
            game_id: &outcome.game_id,
            game_index: outcome.game_index,
            permutation_index: outcome.permutation_index,
            game_seed: outcome.game_seed,
            seat: seat_result.seat.index(),
            bot: &seat_result.agent_name,
            seating: &outcome.seating,
            cards_left: seat_result.cards_left,
            won: seat_result.won,
            tie: outcome.tie,
            reason: outcome.reason.as_str(),
            turns: outcome.turns,
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn build_seats(
    permutation: &[usize],
    agents: &[AgentBlueprint],
    base_seed: u64,
) -> Result<(Vec<SeatState>, Vec<Box<dyn Policy>>), RunnerError> {
    let mut seats = Vec::with_capacity(permutation.len());
    let mut policies = Vec::with_capacity(permutation.len());
    for (seat_idx, agent_idx) in permutation.iter().enumerate() {
        let seat = PlayerId::from_index(seat_idx).ok_or(RunnerError::InvalidPermutation {
            index: seat_idx,
            agent_index: *agent_idx,
        })?;
        let agent = agents
            .get(*agent_idx)
            .ok_or(RunnerError::InvalidPermutation {
                index: seat_idx,
                agent_index: *agent_idx,
            })?;
        seats.push(SeatState {
            seat,
            agent_name: agent.name.clone(),
        });
        policies.push(agent.spawn_policy(base_seed));
    }
    Ok((seats, policies))
}

struct SeatState {
    seat: PlayerId,
    agent_name: String,
}

/// Everything the log writer and analytics need from one finished game.
pub struct GameOutcome {
    pub game_id: String,
    pub game_index: usize,
    pub permutation_index: usize,
    pub game_seed: u64,
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub reason: EndReason,
    pub tie: bool,
    pub turns: usize,
}

impl GameOutcome {
    fn from_record(
        game_id: String,
        game_index: usize,
        permutation_index: usize,
        seats: &[SeatState],
        record: &GameRecord,
    ) -> Self {
        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.seat.index(),
                bot: seat.agent_name.clone(),
            })
            .collect();

        let seat_results = seats
            .iter()
            .map(|seat| SeatResult {
                agent_name: seat.agent_name.clone(),
                seat: seat.seat,
                cards_left: record.result.cards_left[seat.seat.index()],
                won: record.result.winner.contains(seat.seat),
                metrics: DecisionSummary::from(&record.seats[seat.seat.index()]),
            })
            .collect();

        Self {
            game_id,
            game_index,
            permutation_index,
            game_seed: record.seed,
            seating,
            seat_results,
            reason: record.result.reason,
            tie: record.result.winner.is_tie(),
            turns: record.turns.len(),
        }
    }
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: usize,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: PlayerId,
    pub cards_left: usize,
    pub won: bool,
    pub metrics: DecisionSummary,
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

impl From<&SeatStats> for DecisionSummary {
    fn from(stats: &SeatStats) -> Self {
        Self {
            decisions: stats.decisions,
            avg_ms_per_decision: stats.average_decision().as_secs_f64() * 1000.0,
            total_ms: stats.thinking.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    permutation_index: usize,
    game_seed: u64,
    seat: usize,
    bot: &'a str,
    seating: &'a [SeatSnapshot],
    cards_left: usize,
    won: bool,
    tie: bool,
    reason: &'static str,
    turns: usize,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid table: {0}")]
    Table(#[from] GameError),
    #[error("game {game_id} failed: {source}")]
    Game {
        game_id: String,
        #[source]
        source: DriverError,
    },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] crate::analytics::AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameter for agent '{name}': {message}")]
    InvalidParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    kind: BotKind,
    seed: u64,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs
            .iter()
            .enumerate()
            .map(|(index, config)| Self::from_config(index, config))
            .collect()
    }

    fn from_config(index: usize, config: &AgentConfig) -> Result<Self, AgentError> {
        let seed = match config.params.get("seed") {
            None => index as u64,
            Some(value) => value.as_u64().ok_or_else(|| AgentError::InvalidParam {
                name: config.name.clone(),
                message: "seed must be a non-negative integer".to_string(),
            })?,
        };

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind.into(),
            seed,
        })
    }

    /// Each agent keeps its own stream across seatings; the deal seed mixes in
    /// so games differ.
    fn spawn_policy(&self, base_seed: u64) -> Box<dyn Policy> {
        self.kind.spawn(Some(self.seed ^ base_seed))
    }
}
