// =============================================================================
// Analysis Aggregator
// =============================================================================
//
// Thin composition boundary between the pure indicator / profile code and the
// presentation layer.  Nothing here computes anything new: it runs the
// indicator functions, collects their outputs under stable keys and bundles
// them with the bars they were computed from.
//
// `null` (insufficient history) from any indicator is propagated untouched.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::EngineResult;
use crate::gap_analysis::{enhance_daily_bars, EnrichedBar};
use crate::indicators::{
    calculate_adr, calculate_atr, calculate_ema, calculate_pivot_points, calculate_rsi,
    calculate_sma, calculate_volume_sma, calculate_wma, round2, PivotPoints, ADR_PERIOD,
    ATR_PERIOD, MOVING_AVERAGE_PERIODS, RSI_PERIOD, VOLUME_SMA_PERIOD,
};
use crate::market_data::{newest_first, with_price_changes, Bar, IntradayBar};
use crate::profile::{
    calculate_market_profile_with, candlestick_summary, CandlestickSummary, MarketProfileAnalysis,
    SessionStats,
};
use crate::runtime_config::{EngineConfig, MovingAverage};
use crate::types::MovingAverageType;

// =============================================================================
// Types
// =============================================================================

/// Flat indicator mapping for one symbol's daily history.
///
/// Serialises as `{ "sma5": 102.0, "rsi14": null, ..., "pivotPoints": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorResult {
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
    #[serde(rename = "pivotPoints")]
    pub pivot_points: Option<PivotPoints>,
}

impl IndicatorResult {
    /// Value for `key`; `None` both for unknown keys and for `null` values.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }

    /// Whether `key` was computed (its value may still be `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.values.insert(key.into(), value);
    }
}

/// Newest close versus the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub change: f64,
    pub change_percent: f64,
}

/// Everything the daily table shows for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub symbol: String,
    pub last_close: Option<f64>,
    pub price_change: Option<PriceChange>,
    pub indicators: IndicatorResult,
    /// Enriched bars, newest first.
    pub bars: Vec<EnrichedBar>,
}

/// Everything the market-profile page shows for one symbol and session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayReport {
    pub symbol: String,
    pub date: NaiveDate,
    pub stats: SessionStats,
    pub profile: MarketProfileAnalysis,
    pub summary: CandlestickSummary,
}

// =============================================================================
// Indicator composition
// =============================================================================

/// Value of one configured moving average.
pub fn moving_average(bars: &[Bar], ma: &MovingAverage) -> Option<f64> {
    match ma.kind {
        MovingAverageType::Sma => calculate_sma(bars, ma.period),
        MovingAverageType::Ema => calculate_ema(bars, ma.period),
        MovingAverageType::Wma => calculate_wma(bars, ma.period),
    }
}

fn insert_oscillators(
    result: &mut IndicatorResult,
    bars: &[Bar],
    volatility: bool,
    rsi: bool,
    volume: bool,
) {
    if volatility {
        result.insert(format!("atr{ATR_PERIOD}"), calculate_atr(bars, ATR_PERIOD));
        result.insert(format!("adr{ADR_PERIOD}"), calculate_adr(bars, ADR_PERIOD));
    }
    if rsi {
        result.insert(format!("rsi{RSI_PERIOD}"), calculate_rsi(bars, RSI_PERIOD));
    }
    if volume {
        result.insert(
            format!("volumeSMA{VOLUME_SMA_PERIOD}"),
            calculate_volume_sma(bars, VOLUME_SMA_PERIOD).map(|v| v as f64),
        );
    }
}

/// Every default indicator: SMA and EMA for all standard periods, ATR(14),
/// ADR(20), RSI(14), Volume SMA(20) and pivot points.
pub fn calculate_all_indicators(bars: &[Bar]) -> IndicatorResult {
    let mut result = IndicatorResult::default();

    insert_oscillators(&mut result, bars, true, true, true);
    for period in MOVING_AVERAGE_PERIODS {
        result.insert(MovingAverageType::Sma.key(period), calculate_sma(bars, period));
        result.insert(MovingAverageType::Ema.key(period), calculate_ema(bars, period));
    }
    result.pivot_points = calculate_pivot_points(bars);

    result
}

/// Only the indicators `config` asks for: its enabled moving averages plus
/// the volatility / RSI / volume columns that are switched on.  Pivot points
/// are always included.
pub fn calculate_configured_indicators(bars: &[Bar], config: &EngineConfig) -> IndicatorResult {
    let mut result = IndicatorResult::default();

    for ma in config.enabled_moving_averages() {
        result.insert(ma.key.clone(), moving_average(bars, ma));
    }
    insert_oscillators(
        &mut result,
        bars,
        config.show_volatility,
        config.show_rsi,
        config.show_volume,
    );
    result.pivot_points = calculate_pivot_points(bars);

    result
}

/// Change of the newest close against the one before it.  `None` with fewer
/// than two bars.
pub fn price_change(bars: &[Bar]) -> Option<PriceChange> {
    let ordered = newest_first(bars);
    let (current, previous) = (ordered.first()?, ordered.get(1)?);
    let change = current.close - previous.close;
    let pct = if previous.close != 0.0 {
        (change / previous.close) * 100.0
    } else {
        0.0
    };
    Some(PriceChange {
        change: round2(change),
        change_percent: round2(pct),
    })
}

// =============================================================================
// Reports
// =============================================================================

/// Compose the daily report for one symbol.
pub fn analyze_daily(symbol: &str, bars: &[Bar], config: &EngineConfig) -> DailyReport {
    let indicators = calculate_configured_indicators(bars, config);
    let mut enriched = enhance_daily_bars(&with_price_changes(bars));
    enriched.reverse();

    let report = DailyReport {
        symbol: symbol.to_string(),
        last_close: enriched.first().map(|b| b.bar.close),
        price_change: price_change(bars),
        indicators,
        bars: enriched,
    };

    debug!(
        symbol,
        bars = bars.len(),
        indicators = report.indicators.values.len(),
        "daily analysis complete"
    );

    report
}

/// Compose the intraday report for one symbol and session.
///
/// Propagates [`crate::EngineError::EmptySession`]; callers should treat it
/// as "no analysis available".
pub fn analyze_intraday(
    symbol: &str,
    date: NaiveDate,
    bars: &[IntradayBar],
    config: &EngineConfig,
) -> EngineResult<IntradayReport> {
    let profile = calculate_market_profile_with(bars, &config.profile)?;
    let stats = SessionStats::from_bars(bars).ok_or(crate::EngineError::EmptySession)?;
    let summary = candlestick_summary(&profile.candlestick_patterns);

    debug!(
        symbol,
        %date,
        poc = profile.point_of_control,
        profile_type = %profile.profile_type,
        "intraday analysis complete"
    );

    Ok(IntradayReport {
        symbol: symbol.to_string(),
        date,
        stats,
        profile,
        summary,
    })
}

/// Daily reports for every configured ticker that has history, in the
/// configured order.  Symbols are independent, so they are evaluated in
/// parallel.
pub fn analyze_symbols(
    histories: &HashMap<String, Vec<Bar>>,
    config: &EngineConfig,
) -> Vec<DailyReport> {
    let available: Vec<(&String, &Vec<Bar>)> = config
        .tickers
        .iter()
        .filter_map(|t| match histories.get(t) {
            Some(bars) => Some((t, bars)),
            None => {
                debug!(symbol = %t, "no history supplied, skipping");
                None
            }
        })
        .collect();

    available
        .par_iter()
        .map(|(symbol, bars)| analyze_daily(symbol, bars, config))
        .collect()
}
