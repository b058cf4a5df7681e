//! ratings-loader: sync analyst ratings from the external feed and query trading windows.
//!
//! Usage:
//!   cargo run -p ratings-loader -- --sync
//!   cargo run -p ratings-loader -- --job 3f2b...
//!   cargo run -p ratings-loader -- --analyze AAPL MSFT --start 2024-01-01 --end 2024-06-30
//!   cargo run -p ratings-loader -- --global
//!   cargo run -p ratings-loader -- --list 2 --page-size 50

use anyhow::Context;
use ratings_core::{parse_date_bound, DateWindow};
use ratings_feed::FeedClient;
use ratings_store::{list_ratings, RatingsDb, SqliteJobStore, SqliteRatingStore};
use ratings_sync::{SyncConfig, SyncService};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use trading_analyzer::TradingAnalyzer;
use uuid::Uuid;

const DEFAULT_DATABASE_URL: &str = "sqlite:ratings.db?mode=rwc";
const DEFAULT_LIST_PAGE_SIZE: i64 = 20;
const JOB_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq)]
enum Command {
    Sync,
    Job(Uuid),
    Analyze(Vec<String>),
    Global,
    List { page: i64, page_size: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ratings_loader=info,ratings_sync=info,ratings_feed=info,trading_analyzer=info".into()
            }),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(command) = parse_command(&args)? else {
        print_usage();
        std::process::exit(1);
    };
    let window = parse_window(&args)?;

    let db_url = flag_value(&args, "--db")
        .map(str::to_string)
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    tracing::info!("ratings-loader: db={}", db_url);
    let db = RatingsDb::new(&db_url)
        .await
        .with_context(|| format!("opening {}", db_url))?;
    let ratings = Arc::new(SqliteRatingStore::new(db.clone()));

    match command {
        Command::Sync => {
            let config = SyncConfig::default();
            let max_wait = config.deadline;
            let service = SyncService::new(
                Arc::new(SqliteJobStore::new(db)),
                ratings,
                Arc::new(FeedClient::from_env()),
                config,
            );

            let job = service.trigger_sync().await?;
            tracing::info!("Started sync job {}", job.id);

            let job = service
                .wait_for_terminal(job.id, JOB_POLL_INTERVAL, max_wait)
                .await?;
            print_json(&job)?;
        }
        Command::Job(id) => {
            let service = SyncService::new(
                Arc::new(SqliteJobStore::new(db)),
                ratings,
                Arc::new(FeedClient::from_env()),
                SyncConfig::default(),
            );
            print_json(&service.get_job(id).await?)?;
        }
        Command::Analyze(tickers) => {
            let analyzer = TradingAnalyzer::new(ratings);
            if let [ticker] = tickers.as_slice() {
                print_json(&analyzer.analyze_single(ticker, window).await?)?;
            } else {
                print_json(&analyzer.analyze_multiple(&tickers, window).await?)?;
            }
        }
        Command::Global => {
            let analyzer = TradingAnalyzer::new(ratings);
            print_json(&analyzer.analyze_global(window).await?)?;
        }
        Command::List { page, page_size } => {
            print_json(&list_ratings(ratings.as_ref(), page, page_size).await?)?;
        }
    }

    Ok(())
}

fn parse_command(args: &[String]) -> anyhow::Result<Option<Command>> {
    if args.iter().any(|a| a == "--sync") {
        return Ok(Some(Command::Sync));
    }

    if let Some(raw) = flag_value(args, "--job") {
        let id = Uuid::parse_str(raw).with_context(|| format!("invalid job id {}", raw))?;
        return Ok(Some(Command::Job(id)));
    }

    if args.iter().any(|a| a == "--analyze") {
        let tickers = flag_list(args, "--analyze");
        if tickers.is_empty() {
            anyhow::bail!("--analyze needs at least one ticker");
        }
        return Ok(Some(Command::Analyze(tickers)));
    }

    if args.iter().any(|a| a == "--global") {
        return Ok(Some(Command::Global));
    }

    if args.iter().any(|a| a == "--list") {
        let page = parse_number(args, "--list")?.unwrap_or(1);
        let page_size = parse_number(args, "--page-size")?.unwrap_or(DEFAULT_LIST_PAGE_SIZE);
        return Ok(Some(Command::List { page, page_size }));
    }

    Ok(None)
}

/// `--start`/`--end` as midnight UTC bounds; either may be omitted.
fn parse_window(args: &[String]) -> anyhow::Result<DateWindow> {
    let start = flag_value(args, "--start").map(parse_date_bound).transpose()?;
    let end = flag_value(args, "--end").map(parse_date_bound).transpose()?;
    Ok(DateWindow::new(start, end))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|v| !v.starts_with("--"))
        .map(|s| s.as_str())
}

fn flag_list(args: &[String], flag: &str) -> Vec<String> {
    match args.iter().position(|a| a == flag) {
        Some(idx) => args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

fn parse_number(args: &[String], flag: &str) -> anyhow::Result<Option<i64>> {
    flag_value(args, flag)
        .map(|v| v.parse::<i64>().with_context(|| format!("{} expects a number, got {}", flag, v)))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  ratings-loader --sync                     Ingest the external feed and wait for the job");
    eprintln!("  ratings-loader --job ID                   Show a sync job");
    eprintln!("  ratings-loader --analyze AAPL [MSFT ...]  Best trade for one ticker, or ranked for several");
    eprintln!("  ratings-loader --global                   Best trade across every stored ticker");
    eprintln!("  ratings-loader --list [PAGE]              Page through stored ratings");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --start YYYY-MM-DD   Earliest rating time (inclusive, midnight UTC)");
    eprintln!("  --end YYYY-MM-DD     Latest rating time (inclusive, midnight UTC)");
    eprintln!("  --page-size N        Ratings per page for --list (default: {})", DEFAULT_LIST_PAGE_SIZE);
    eprintln!("  --db URL             SQLite URL (default: $DATABASE_URL or {})", DEFAULT_DATABASE_URL);
}
