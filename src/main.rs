//! CLI entry point for the MTA segment watcher.
//!
//! `dump` writes the current system snapshot to a JSON file once. `watch`
//! polls on a fixed interval and logs every completed station-to-station
//! segment.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mta_segments::config::{DEFAULT_BASE_URL, Division, Settings, selected_divisions};
use mta_segments::feed::{FeedSource, LiveFeed};
use mta_segments::fetch::{BasicClient, auth::ApiKey};
use mta_segments::output::{log_segment, write_snapshot};
use mta_segments::processor::StateProcessor;
use mta_segments::static_data::StaticData;
use mta_segments::store::MemoryStore;
use mta_segments::system::{StateOracle, TransitSystem};
use reqwest::Url;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mta_segments")]
#[command(about = "Derive completed subway segments from MTA real-time feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every selected feed once and write the snapshot as JSON
    Dump {
        /// Output file
        #[arg(short, long, default_value = "output.json")]
        out: String,

        /// Divisions to fetch (repeatable; default all)
        #[arg(short, long, value_enum)]
        division: Vec<Division>,

        /// Base URL of the feed service
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// Poll continuously and log completed segments
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        refresh: u64,

        /// Divisions to fetch (repeatable; default all)
        #[arg(short, long, value_enum)]
        division: Vec<Division>,

        /// Base URL of the feed service
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Directory holding Stations.csv and routes.txt, for readable logs
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/mta_segments.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mta_segments.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Dump {
            out,
            division,
            base_url,
        } => {
            let system = build_system(&settings, &base_url, &division)?;
            let snapshot = system.current_state().await?;
            write_snapshot(&out, &snapshot)?;
            info!(out = %out, trips = snapshot.len(), "Snapshot dumped");
        }
        Commands::Watch {
            refresh,
            division,
            base_url,
            static_dir,
        } => {
            let names = static_dir
                .as_deref()
                .map(StaticData::load)
                .transpose()?;
            let system = build_system(&settings, &base_url, &division)?;
            watch(system, refresh, names).await;
        }
    }

    Ok(())
}

/// Builds one authenticated live feed per selected division.
fn build_system(settings: &Settings, base_url: &str, divisions: &[Division]) -> Result<TransitSystem> {
    let base = Url::parse(base_url).with_context(|| format!("Invalid base url {base_url}"))?;

    let mut feeds: Vec<Box<dyn FeedSource>> = Vec::new();
    for division in selected_divisions(divisions) {
        let client = ApiKey::mta(BasicClient::new()?, &settings.api_key)?;
        let endpoint = division.endpoint(&base)?;
        info!(division = division.name(), %endpoint, "Feed configured");
        feeds.push(Box::new(LiveFeed::new(division.name(), endpoint, client)));
    }

    Ok(TransitSystem::new(feeds))
}

/// Runs ticks forever. A failed tick is logged and the next one retries from
/// the last recorded state.
#[tracing::instrument(skip(system, names))]
async fn watch(system: TransitSystem, refresh: u64, names: Option<StaticData>) {
    let processor = StateProcessor::new(system, MemoryStore::new());

    // the first tick fires immediately
    let mut ticker = tokio::time::interval(Duration::from_secs(refresh));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match processor.process_updates().await {
            Ok(results) => {
                for segment in &results.completed_segments {
                    log_segment(segment, names.as_ref());
                }
            }
            Err(e) => {
                error!(error = %e, "Tick failed");
            }
        }
    }
}
