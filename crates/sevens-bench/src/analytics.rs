use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, GameOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        Self {
            agents,
            agent_order: order,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;

            acc.record_game(seat.cards_left, seat.won, outcome.tie, &seat.metrics);
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let agents = self
            .agent_order
            .iter()
            .filter_map(|name| self.agents.remove(name))
            .map(AgentAccumulator::into_report)
            .collect();
        AnalyticsSummary { agents }
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    games: u32,
    wins: u32,
    outright_wins: u32,
    ties: u32,
    per_game_cards: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            games: 0,
            wins: 0,
            outright_wins: 0,
            ties: 0,
            per_game_cards: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_game(&mut self, cards_left: usize, won: bool, tie: bool, metrics: &DecisionSummary) {
        self.games += 1;
        self.per_game_cards.push(cards_left as f64);
        if won {
            self.wins += 1;
            if tie {
                self.ties += 1;
            } else {
                self.outright_wins += 1;
            }
        }
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let avg_cards_left = mean(&self.per_game_cards);
        let ci95 = confidence_interval(&self.per_game_cards);
        let average_ms_per_decision = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.name,
            kind: self.kind,
            games: self.games as usize,
            wins: self.wins as usize,
            outright_wins: self.outright_wins as usize,
            ties: self.ties as usize,
            avg_cards_left,
            ci95,
            average_ms_per_decision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    #[serde(skip)]
    pub kind: AgentKind,
    pub games: usize,
    pub wins: usize,
    pub outright_wins: usize,
    pub ties: usize,
    pub avg_cards_left: f64,
    pub ci95: (f64, f64),
    pub average_ms_per_decision: f64,
}

impl AgentReport {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub agents: Vec<AgentReport>,
}

impl AnalyticsSummary {
    pub fn to_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str("| Agent | Kind | Games | Win % | Outright | Ties | Avg cards left | 95% CI | Avg ms/decision |\n");
        rows.push_str("|-------|------|-------|-------|----------|------|----------------|--------|-----------------|\n");
        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {win:.1}% | {outright} | {ties} | {avg:.3} | [{ci_low:.3}, {ci_high:.3}] | {latency:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                win = agent.win_rate() * 100.0,
                outright = agent.outright_wins,
                ties = agent.ties,
                avg = agent.avg_cards_left,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                latency = agent.average_ms_per_decision,
            ));
        }
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(values);
    if values.len() == 1 {
        return (mean, mean);
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let std_error = (variance / values.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
