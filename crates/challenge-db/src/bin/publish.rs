//! # Question Publisher
//!
//! Schedules a question from a JSON file as the question of the day.
//!
//! ## Usage
//! ```bash
//! # Publish for today against PostgreSQL (CHALLENGE_DB_* / .env)
//! cargo run -p challenge-db --bin publish -- --file two-sum.json
//!
//! # Publish for a specific day
//! cargo run -p challenge-db --bin publish -- --file two-sum.json --date 2026-10-17
//!
//! # Use a local SQLite file instead
//! cargo run -p challenge-db --bin publish -- --file two-sum.json --sqlite ./challenge.db
//! ```
//!
//! ## File Format
//! ```json
//! {
//!   "title": "Two Sum",
//!   "description": "Return the indices of the two numbers that add up to target",
//!   "level": "easy",
//!   "tests": [
//!     { "params": ["[2,7,11,15]", "9"], "response": "[0,1]" },
//!     { "params": ["[3,2,4]", "6"], "response": "[1,2]" },
//!     { "params": ["[3,3]", "6"], "response": "[0,1]" }
//!   ]
//! }
//! ```
//! An optional `"date": "YYYY-MM-DD"` in the file is used when `--date` is
//! not given.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use challenge_core::{Question, TestCase, TESTS_PER_QUESTION};
use challenge_db::{
    migrations, ChallengeRepository, DbConfig, PgRepository, SqliteConfig, SqliteRepository,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Question as written by hand in a JSON file.
#[derive(Debug, Deserialize)]
struct QuestionFile {
    title: String,
    description: String,
    level: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    tests: Vec<TestCase>,
}

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    date: Option<NaiveDate>,
    sqlite: Option<PathBuf>,
}

const USAGE: &str = "\
Daily Challenge Question Publisher

Usage: publish --file <PATH> [OPTIONS]

Options:
  -f, --file <PATH>      Question JSON file (required)
  -d, --date <DATE>      Publish date, YYYY-MM-DD (default: today)
      --sqlite <PATH>    Use a SQLite database file instead of PostgreSQL
  -h, --help             Show this help message";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let Some(args) = parse_args(env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let file = args.file.context("missing --file\n\nRun with --help for usage")?;
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
    let parsed: QuestionFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let date = args
        .date
        .or(parsed.date)
        .unwrap_or_else(|| Local::now().date_naive());
    let question = into_question(parsed, date)?;

    let repo: Arc<dyn ChallengeRepository> = match args.sqlite {
        Some(path) => {
            info!(path = %path.display(), "Using SQLite database");
            let repo = SqliteRepository::connect(&SqliteConfig::new(path)).await?;
            let (total, applied) = migrations::sqlite_status(repo.pool()).await?;
            info!(total, applied, "Schema migrations");
            Arc::new(repo)
        }
        None => {
            let config = DbConfig::from_env()?;
            info!(dsn = %config.redacted_dsn(), "Using PostgreSQL database");
            let repo = PgRepository::connect(&config).await?;
            let (total, applied) = migrations::postgres_status(repo.pool()).await?;
            info!(total, applied, "Schema migrations");
            Arc::new(repo)
        }
    };

    match repo.read_question_on(date).await {
        Ok(existing) => bail!(
            "{} already has a question: '{}' ({})",
            date,
            existing.title,
            existing.id
        ),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    repo.create_question(&question).await?;

    info!(id = %question.id, %date, title = %question.title, "Question published");
    Ok(())
}

/// Parses command line arguments. `Ok(None)` means help was requested.
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Option<Args>> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-f" | "--file" => {
                parsed.file = Some(args.next().context("--file needs a path")?.into());
            }
            "-d" | "--date" => {
                let raw = args.next().context("--date needs a value")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", raw))?;
                parsed.date = Some(date);
            }
            "--sqlite" => {
                parsed.sqlite = Some(args.next().context("--sqlite needs a path")?.into());
            }
            "-h" | "--help" => return Ok(None),
            other => bail!("unknown argument '{}'\n\nRun with --help for usage", other),
        }
    }

    Ok(Some(parsed))
}

fn into_question(file: QuestionFile, date: NaiveDate) -> anyhow::Result<Question> {
    let count = file.tests.len();
    let tests: [TestCase; TESTS_PER_QUESTION] = file.tests.try_into().map_err(|_| {
        anyhow::anyhow!(
            "a question needs exactly {} test cases, found {}",
            TESTS_PER_QUESTION,
            count
        )
    })?;

    Ok(Question::new(file.title, file.description, date, file.level, tests))
}

/// Initializes logging. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,challenge=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
