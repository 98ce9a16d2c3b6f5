use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};

use turkey_maze::collision::{agent_box, blocked};
use turkey_maze::constants::{TICK_RATE, TICK_SECS};
use turkey_maze::engine::GameEngine;
use turkey_maze::rng::Rng;
use turkey_maze::types::{GameConfig, GameOverReason, InputState, RuntimeEvent, Snapshot, Vec3};

// How often the scripted walker re-rolls its held keys.
const INPUT_REROLL_SECS: f32 = 0.4;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    #[arg(long)]
    creatures: Option<usize>,
    #[arg(long)]
    seconds: Option<f32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    runs: Option<usize>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    width: i32,
    height: i32,
    creatures: usize,
    seconds: f32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    width: i32,
    height: i32,
    creatures: usize,
    seconds: f32,
    reason: GameOverReason,
    #[serde(rename = "durationSecs")]
    duration_secs: f32,
    score: i32,
    alerts: i32,
    calms: i32,
    #[serde(rename = "creaturesLeft")]
    creatures_left: usize,
    message: String,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "generatedAtIso")]
    generated_at_iso: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationSecs")]
    average_duration_secs: f32,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_secs = 0.0f32;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "width": scenario.width,
                "height": scenario.height,
                "creatures": scenario.creatures,
                "seconds": scenario.seconds,
            }),
        );

        let scenario_run = match run_scenario(&scenario) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_failed",
                    &run_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_secs += scenario_run.result.duration_secs;
        *reason_counts
            .entry(game_over_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationSecs": scenario_run.result.duration_secs,
                "score": scenario_run.result.score,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
        total_duration_secs,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationSecs": summary.average_duration_secs,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> Result<ScenarioRunResult, turkey_maze::error::GameError> {
    let mut engine = GameEngine::new(GameConfig {
        width: scenario.width,
        height: scenario.height,
        creature_count: scenario.creatures,
        time_limit_secs: scenario.seconds,
        seed: scenario.seed,
    })?;

    let mut input_rng = Rng::new(scenario.seed ^ 0x5eed_cafe);
    let mut input_timer = 0.0f32;
    let mut alerts = 0;
    let mut calms = 0;
    let mut last_score = 0;
    let mut last_creatures = engine.creature_count();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;

    // Timeout alone bounds the run; the tick cap is a backstop against
    // a broken clock.
    let tick_cap = (scenario.seconds * TICK_RATE as f32 * 4.0) as u64 + 64;

    while !engine.is_ended() {
        input_timer -= TICK_SECS;
        if input_timer <= 0.0 {
            engine.set_input(next_input(&mut input_rng));
            input_timer = INPUT_REROLL_SECS;
        }

        engine.step(TICK_SECS);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::CreatureAlerted { .. } => alerts += 1,
                RuntimeEvent::CreatureCalmed { .. } => calms += 1,
                RuntimeEvent::CreatureCaught { .. } => {}
            }
        }

        for message in collect_snapshot_anomalies(&engine, &snapshot, last_score, last_creatures) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.score;
        last_creatures = snapshot.creatures.len();

        if snapshot.tick > tick_cap {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                "tick safety limit exceeded".to_string(),
            );
            break;
        }
    }

    let summary = engine.build_summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            width: scenario.width,
            height: scenario.height,
            creatures: scenario.creatures,
            seconds: scenario.seconds,
            reason: summary.reason,
            duration_secs: summary.duration_secs,
            score: summary.score,
            alerts,
            calms,
            creatures_left: engine.creature_count(),
            message: summary.message,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    })
}

fn next_input(rng: &mut Rng) -> InputState {
    InputState {
        forward: rng.next_f32() < 0.4,
        back: rng.next_f32() < 0.4,
        left: rng.next_f32() < 0.4,
        right: rng.next_f32() < 0.4,
    }
}

fn collect_snapshot_anomalies(
    engine: &GameEngine,
    snapshot: &Snapshot,
    last_score: i32,
    last_creatures: usize,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.time_left.is_finite() || snapshot.time_left < 0.0 {
        anomalies.push(format!("invalid time left: {}", snapshot.time_left));
    }
    if snapshot.score < last_score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            last_score, snapshot.score
        ));
    }
    if snapshot.creatures.len() > last_creatures {
        anomalies.push(format!(
            "creature count grew: {} -> {}",
            last_creatures,
            snapshot.creatures.len()
        ));
    }

    let player_pos = Vec3::new(snapshot.player.x, snapshot.player.y, snapshot.player.z);
    if blocked(&agent_box(player_pos), engine.maze.walls()) {
        anomalies.push("player overlaps a wall volume".to_string());
    }
    for creature in &snapshot.creatures {
        let pos = Vec3::new(creature.x, creature.y, creature.z);
        if blocked(&agent_box(pos), engine.maze.walls()) {
            anomalies.push(format!("creature overlaps a wall volume: {}", creature.id));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let base_seed = cli.seed.unwrap_or_else(|| rand::random::<u32>());
    let defaults = GameConfig::default();
    let width = cli.width.unwrap_or(defaults.width);
    let height = cli.height.unwrap_or(defaults.height);
    let creatures = cli.creatures.unwrap_or(defaults.creature_count);
    let seconds = cli.seconds.unwrap_or(defaults.time_limit_secs);
    let runs = cli.runs.unwrap_or(1).max(1);

    (0..runs)
        .map(|idx| Scenario {
            name: format!("run-{:02}", idx + 1),
            width,
            height,
            creatures,
            seconds,
            seed: base_seed.wrapping_add(idx as u32),
        })
        .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_duration_secs: f32,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_secs = if scenario_count == 0 {
        0.0
    } else {
        total_duration_secs / scenario_count as f32
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_count,
        anomaly_count,
        average_duration_secs,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn game_over_reason_key(reason: GameOverReason) -> String {
    match reason {
        GameOverReason::Escaped => "escaped",
        GameOverReason::Timeout => "timeout",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
