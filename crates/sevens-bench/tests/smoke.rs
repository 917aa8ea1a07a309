use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use sevens_bench::config::BenchmarkConfig;
use sevens_bench::tournament::{RunSummary, TournamentRunner};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn config_yaml(output_dir: &Path) -> String {
    format!(
        r#"
run_id: "test_smoke"
games:
  seed: 4242
  count: 3
  permutations: 6
agents:
  - name: "chaos"
    kind: "random"
    params:
      seed: 11
  - name: "greedy"
    kind: "greedy"
  - name: "chaos_2"
    kind: "random"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("{run_id}").join("games.jsonl").display(),
        summary = output_dir.join("{run_id}").join("summary.md").display(),
    )
}

fn run_in(output_dir: &Path) -> RunSummary {
    let mut cfg: BenchmarkConfig =
        serde_yaml::from_str(&config_yaml(output_dir)).expect("valid yaml");
    cfg.validate().expect("config validates");
    let outputs = cfg.resolved_outputs();
    TournamentRunner::new(cfg, outputs)
        .expect("runner created")
        .run()
        .expect("tournament completes")
}

/// Hash of the JSONL rows with the wall-clock fields zeroed.
fn normalized_digest(path: &Path) -> String {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    let mut normalized = String::new();
    for line in jsonl.lines() {
        let mut value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        if let Some(speed) = value.get_mut("speed_ms_turn") {
            *speed = serde_json::json!(0.0);
        }
        normalized.push_str(&serde_json::to_string(&value).expect("re-serialize normalized row"));
        normalized.push('\n');
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn tournament_writes_one_row_per_seat_per_game() {
    let dir = tempdir().expect("temp dir");
    let summary = run_in(dir.path());

    assert_eq!(summary.games_played, 3);
    assert_eq!(summary.permutations, 6);
    assert_eq!(summary.rows_written, 3 * 6 * 3);
    assert!(summary.telemetry_path.is_none());
    assert!(summary.jsonl_path.ends_with("test_smoke/games.jsonl"));

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let rows: Vec<serde_json::Value> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes"))
        .collect();
    assert_eq!(rows.len(), summary.rows_written);

    for game in rows.chunks(3) {
        let seed = &game[0]["game_seed"];
        assert!(game.iter().all(|row| &row["game_seed"] == seed));
        assert!(game.iter().any(|row| row["won"] == true), "every game has a winner");
        let tie = game[0]["tie"].as_bool().unwrap();
        let winners = game.iter().filter(|row| row["won"] == true).count();
        assert_eq!(tie, winners > 1);
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| chaos | Random |"));
    assert!(markdown.contains("| greedy | Greedy |"));
}

#[test]
fn same_config_reproduces_the_same_rows() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");
    let a = run_in(first.path());
    let b = run_in(second.path());

    assert_eq!(
        normalized_digest(&a.jsonl_path),
        normalized_digest(&b.jsonl_path),
        "seeded runs diverged"
    );
}

#[test]
fn cli_validate_only_skips_the_run() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("bench.yaml");
    fs::write(&config_path, config_yaml(dir.path())).expect("write config");

    Command::cargo_bin("sevens-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config_path)
        .arg("--games")
        .arg("2")
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 games"))
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!dir.path().join("test_smoke").join("games.jsonl").exists());
}

#[test]
fn cli_reports_invalid_config() {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("bench.yaml");
    let yaml = config_yaml(dir.path()).replace("count: 3", "count: 0");
    fs::write(&config_path, yaml).expect("write config");

    Command::cargo_bin("sevens-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("games.count"));
}
