mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use sqlx::SqliteConnection;
use thiserror::Error;

use realmseed_core::builtin_init_script;
use realmseed_eval::{
    EvalError, HarnessConfig, collect_stats, render_harness_report, render_stats, run_harness,
};
use realmseed_generate::{
    GenerationEngine, GenerationError, GenerationReport, OpenMode, apply_script, open_store,
};
use realmseed_plan::{PlanError, SeedPlan, load_plan};

use crate::logging::init_logging;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "realmseed",
    version,
    about = "Seed and validate a game-state store"
)]
struct Cli {
    /// SQLite store file.
    store_path: PathBuf,

    #[arg(value_enum)]
    command: Command,

    /// Seed plan (.json or .toml). Defaults to the built-in plan.
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Random seed; overrides the seed in the plan.
    #[arg(long)]
    seed: Option<u64>,

    /// Schema-creation script used by `init` instead of the built-in catalog.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write the generation report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Append structured JSON logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Create the catalog and load reference data.
    Init,
    /// Run the generation pipeline.
    Seed,
    /// Print row counts and distributions.
    Stats,
    /// init, then seed, then stats.
    Full,
    /// Run the validation harness.
    Validate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_file.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command; `Ok(false)` means the command ran but failed
/// its checks.
async fn run(cli: Cli) -> Result<bool, CliError> {
    let timer = Instant::now();
    tracing::info!(
        event = "run_started",
        command = ?cli.command,
        store = %cli.store_path.display(),
    );

    let passed = match cli.command {
        Command::Init => {
            let mut conn = open_store(&cli.store_path, OpenMode::Create).await?;
            run_init(&mut conn, &cli).await?;
            true
        }
        Command::Seed => {
            let mut conn = open_store(&cli.store_path, OpenMode::Create).await?;
            run_seed(&mut conn, &cli).await?;
            true
        }
        Command::Stats => {
            let mut conn = open_store(&cli.store_path, OpenMode::ReadOnly).await?;
            run_stats(&mut conn).await?;
            true
        }
        Command::Full => {
            let mut conn = open_store(&cli.store_path, OpenMode::Create).await?;
            run_init(&mut conn, &cli).await?;
            run_seed(&mut conn, &cli).await?;
            run_stats(&mut conn).await?;
            true
        }
        Command::Validate => {
            let mut conn = open_store(&cli.store_path, OpenMode::ReadOnly).await?;
            run_validate(&mut conn).await?
        }
    };

    tracing::info!(
        event = "run_finished",
        status = if passed { "success" } else { "failed" },
        duration_ms = timer.elapsed().as_millis() as u64,
    );
    Ok(passed)
}

async fn run_init(conn: &mut SqliteConnection, cli: &Cli) -> Result<(), CliError> {
    let script = match &cli.script {
        Some(path) => fs::read_to_string(path)?,
        None => builtin_init_script(),
    };
    apply_script(conn, &script).await?;

    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_one(&mut *conn)
    .await?;
    println!("initialized {} ({tables} tables)", cli.store_path.display());
    Ok(())
}

async fn run_seed(conn: &mut SqliteConnection, cli: &Cli) -> Result<(), CliError> {
    let mut plan = resolve_plan(cli.plan.as_deref())?;
    if let Some(seed) = cli.seed {
        plan.seed = Some(seed);
    }

    let report = GenerationEngine::default().run(conn, &plan).await?;
    print!("{}", render_generation_summary(&report));

    if let Some(path) = &cli.report {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(event = "report_written", path = %path.display());
    }
    Ok(())
}

async fn run_stats(conn: &mut SqliteConnection) -> Result<(), CliError> {
    let stats = collect_stats(conn).await?;
    print!("{}", render_stats(&stats));
    Ok(())
}

async fn run_validate(conn: &mut SqliteConnection) -> Result<bool, CliError> {
    let report = run_harness(conn, &HarnessConfig::default()).await?;
    print!("{}", render_harness_report(&report));
    Ok(report.passed())
}

fn resolve_plan(path: Option<&Path>) -> Result<SeedPlan, CliError> {
    let Some(path) = path else {
        return Ok(SeedPlan::default());
    };
    let validated = load_plan(path)?;
    for warning in &validated.warnings {
        tracing::warn!(
            event = "plan_warning",
            code = %warning.code,
            path = %warning.path,
            message = %warning.message,
        );
    }
    Ok(validated.plan)
}

fn render_generation_summary(report: &GenerationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "run {} (seed {}, base time {})\n",
        report.run_id, report.seed, report.base_time
    ));
    for phase in &report.phases {
        let tables = phase
            .rows_written
            .iter()
            .map(|(table, rows)| format!("{table}={rows}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "  {:<16} {:>6} rows  {:>5} ms  {}\n",
            phase.phase,
            phase.total_written(),
            phase.duration_ms,
            tables
        ));
    }
    for issue in &report.issues {
        let phase = issue.phase.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "  {} [{}] {}: {}\n",
            issue.level, phase, issue.code, issue.message
        ));
    }
    out.push_str(&format!("finished in {} ms\n", report.duration_ms));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use realmseed_generate::{GenerationIssue, PhaseReport};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_store_path_command_and_flags() {
        let cli = Cli::try_parse_from([
            "realmseed",
            "game.db",
            "seed",
            "--seed",
            "7",
            "--plan",
            "plans/smoke.plan.toml",
        ])
        .expect("parse");
        assert_eq!(cli.command, Command::Seed);
        assert_eq!(cli.store_path, PathBuf::from("game.db"));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.report.is_none());
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Cli::try_parse_from(["realmseed", "game.db", "migrate"]).is_err());
    }

    #[test]
    fn summary_lists_phases_and_issues() {
        let mut report = GenerationReport::new("run-1".to_string(), 42, "2024-01-01 12:00:00".to_string());
        report.phases.push(PhaseReport {
            phase: "characters".to_string(),
            rows_requested: 3,
            rows_written: [("characters".to_string(), 3)].into_iter().collect(),
            duration_ms: 1,
        });
        report.record_issue(GenerationIssue::info(
            "save_slots",
            "no_player_character",
            "no player character",
        ));

        let text = render_generation_summary(&report);
        assert!(text.starts_with("run run-1 (seed 42"));
        assert!(text.contains("characters=3"));
        assert!(text.contains("info [save_slots] no_player_character"));
    }
}
