// =============================================================================
// Runtime Configuration: dashboard universe, indicator list, profile params
// =============================================================================
//
// The engine never reads configuration from ambient/global state: callers
// build an `EngineConfig` (defaults, JSON file, or edits of an existing one)
// and pass it explicitly to the aggregator.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::profile::ProfileParams;
use crate::types::MovingAverageType;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_tickers() -> Vec<String> {
    [
        // Major indices
        "SPY", "QQQ",
        // Top S&P 500 names
        "NVDA", "MSFT", "AAPL", "GOOGL", "AMZN", "META", "AVGO", "TSLA", "BRK-B", "JPM", "WMT",
        "V", "LLY", "ORCL", "MA", "NFLX",
        // Sector ETFs
        "XLK", "XLF", "XLV", "XLI", "XLE", "XLP", "XLY", "XLB", "XLU", "XLRE", "XLC",
        // Others
        "IBIT", "GLD", "SMH", "CL=F", "^VIX", "IWM", "DIA",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_moving_averages() -> Vec<MovingAverage> {
    [
        (5, MovingAverageType::Sma),
        (8, MovingAverageType::Ema),
        (10, MovingAverageType::Sma),
        (20, MovingAverageType::Sma),
        (21, MovingAverageType::Ema),
        (50, MovingAverageType::Sma),
        (100, MovingAverageType::Sma),
        (200, MovingAverageType::Sma),
    ]
    .into_iter()
    .map(|(period, kind)| MovingAverage::new(period, kind))
    .collect()
}

// =============================================================================
// MovingAverage
// =============================================================================

/// One configurable moving-average column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    /// Indicator key, e.g. `sma20`.
    pub key: String,
    /// Display label, e.g. `20D SMA`.
    pub label: String,
    pub period: usize,
    #[serde(rename = "type")]
    pub kind: MovingAverageType,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl MovingAverage {
    pub fn new(period: usize, kind: MovingAverageType) -> Self {
        Self {
            key: kind.key(period),
            label: format!("{period}D {kind}"),
            period,
            kind,
            enabled: true,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration handed to the aggregator.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Symbols shown on the dashboard.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Moving-average columns, in display order.
    #[serde(default = "default_moving_averages")]
    pub moving_averages: Vec<MovingAverage>,

    /// ATR / ADR columns.
    #[serde(default = "default_true")]
    pub show_volatility: bool,

    #[serde(default = "default_true")]
    pub show_rsi: bool,

    /// Volume SMA column.
    #[serde(default = "default_true")]
    pub show_volume: bool,

    /// Market-profile thresholds.
    #[serde(default)]
    pub profile: ProfileParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            moving_averages: default_moving_averages(),
            show_volatility: true,
            show_rsi: true,
            show_volume: true,
            profile: ProfileParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = config.tickers.len(),
            moving_averages = config.moving_averages.len(),
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Reject values the indicator and profile code cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(ma) = self.moving_averages.iter().find(|ma| ma.period == 0) {
            return Err(EngineError::InvalidConfig(format!(
                "moving average {} has a zero period",
                ma.key
            )));
        }
        self.profile.validate()
    }

    /// Fresh default configuration.
    pub fn reset() -> Self {
        Self::default()
    }

    // --- Pure edit operations -----------------------------------------------
    //
    // Each returns a new config and leaves `self` untouched.

    /// Append a moving average.  A no-op when the key already exists.
    pub fn add_moving_average(&self, period: usize, kind: MovingAverageType) -> Self {
        let ma = MovingAverage::new(period, kind);
        let mut next = self.clone();
        if !next.moving_averages.iter().any(|m| m.key == ma.key) {
            next.moving_averages.push(ma);
        }
        next
    }

    pub fn remove_moving_average(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.moving_averages.retain(|m| m.key != key);
        next
    }

    /// Flip the `enabled` flag of the moving average with `key`.
    pub fn toggle_moving_average(&self, key: &str) -> Self {
        let mut next = self.clone();
        for ma in next.moving_averages.iter_mut().filter(|m| m.key == key) {
            ma.enabled = !ma.enabled;
        }
        next
    }

    /// Add a ticker (upper-cased).  A no-op when it is already listed.
    pub fn add_ticker(&self, ticker: &str) -> Self {
        let upper = ticker.trim().to_uppercase();
        let mut next = self.clone();
        if !upper.is_empty() && !next.tickers.contains(&upper) {
            next.tickers.push(upper);
        }
        next
    }

    /// Remove a ticker, matching case-insensitively.
    pub fn remove_ticker(&self, ticker: &str) -> Self {
        let upper = ticker.trim().to_uppercase();
        let mut next = self.clone();
        next.tickers.retain(|t| *t != upper);
        next
    }

    /// Moving averages with `enabled == true`.
    pub fn enabled_moving_averages(&self) -> impl Iterator<Item = &MovingAverage> {
        self.moving_averages.iter().filter(|m| m.enabled)
    }
}
