// =============================================================================
// Market Profile Engine: Command-Line Entry Point
// =============================================================================
//
// Reads bars from JSON files, runs the engine and prints JSON results to
// stdout.  Logs go to stderr.
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use market_profile_engine::{
    analyze_daily, analyze_intraday, analyze_symbols, Bar, EngineConfig, EngineError, IntradayBar,
    MovingAverageType,
};

const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the engine config file (overrides ENGINE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily indicators and enriched bars for one symbol
    Daily {
        symbol: String,
        /// JSON array of daily bars
        bars: PathBuf,
    },

    /// Market profile of one intraday session
    Profile {
        symbol: String,
        /// Session date (YYYY-MM-DD)
        date: NaiveDate,
        /// JSON array of intraday bars
        bars: PathBuf,
    },

    /// Daily reports for every configured ticker found in a directory
    Batch {
        /// Directory containing one `<SYMBOL>.json` file per ticker
        dir: PathBuf,
    },

    /// Show or edit the engine configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    AddTicker { ticker: String },
    RemoveTicker { ticker: String },
    /// Add a moving average, e.g. `add-ma 34 ema`
    AddMa {
        period: usize,
        kind: MovingAverageType,
    },
    RemoveMa { key: String },
    ToggleMa { key: String },
    /// Restore the default configuration
    Reset,
}

fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── 2. Config ────────────────────────────────────────────────────────
    let config_path = cli
        .config
        .or_else(|| std::env::var("ENGINE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path.display(), error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // ── 3. Dispatch ──────────────────────────────────────────────────────
    match cli.command {
        Commands::Daily { symbol, bars } => {
            let bars: Vec<Bar> = read_json(&bars)?;
            let report = analyze_daily(&symbol.to_uppercase(), &bars, &config);
            print_json(&report)
        }
        Commands::Profile { symbol, date, bars } => {
            let bars: Vec<IntradayBar> = read_json(&bars)?;
            match analyze_intraday(&symbol.to_uppercase(), date, &bars, &config) {
                Ok(report) => print_json(&report),
                Err(EngineError::EmptySession) => {
                    warn!(symbol = %symbol, %date, "no intraday bars, no analysis available");
                    Err(EngineError::EmptySession.into())
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Batch { dir } => {
            let histories = load_histories(&dir, &config)?;
            let reports = analyze_symbols(&histories, &config);
            info!(requested = config.tickers.len(), analysed = reports.len(), "batch complete");
            print_json(&reports)
        }
        Commands::Config { action } => {
            let updated = match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => return print_json(&config),
                ConfigAction::AddTicker { ticker } => config.add_ticker(&ticker),
                ConfigAction::RemoveTicker { ticker } => config.remove_ticker(&ticker),
                ConfigAction::AddMa { period, kind } => config.add_moving_average(period, kind),
                ConfigAction::RemoveMa { key } => config.remove_moving_average(&key),
                ConfigAction::ToggleMa { key } => config.toggle_moving_average(&key),
                ConfigAction::Reset => EngineConfig::reset(),
            };
            updated.validate()?;
            updated.save(&config_path)?;
            print_json(&updated)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialise result")?;
    println!("{out}");
    Ok(())
}

/// Bars for every configured ticker that has a `<SYMBOL>.json` file in `dir`.
fn load_histories(dir: &Path, config: &EngineConfig) -> Result<HashMap<String, Vec<Bar>>> {
    let mut histories = HashMap::new();
    for ticker in &config.tickers {
        let path = dir.join(format!("{ticker}.json"));
        if !path.exists() {
            debug!(symbol = %ticker, path = %path.display(), "no bar file");
            continue;
        }
        let bars: Vec<Bar> = read_json(&path)?;
        histories.insert(ticker.clone(), bars);
    }
    Ok(histories)
}
