// =============================================================================
// Candlestick Classifier: single-bar shape recognition
// =============================================================================
//
// Each intraday bar is classified on its own (no lookback):
//
//   body         = |close - open|
//   range        = high - low
//   upper shadow = high - max(open, close)
//   lower shadow = min(open, close) - low
//   body ratio   = body / range   (0 when range == 0)
//
// Rules are evaluated top-to-bottom and the first match wins.  The ranges
// overlap, so the order is part of the contract:
//
//   1. DOJI          - ratio < 0.1
//   2. HAMMER        - ratio < 0.3, lower > 2*body, upper < 0.5*body
//   3. SHOOTING STAR - ratio < 0.3, upper > 2*body, lower < 0.5*body
//   4. SPINNING TOP  - ratio < 0.3, upper > body,   lower > body
//   5. MARUBOZU      - ratio > 0.8
//   6. NORMAL        - bullish when close > open, bearish otherwise

use serde::{Deserialize, Serialize};

use crate::market_data::IntradayBar;

const DOJI_MAX_RATIO: f64 = 0.1;
const SMALL_BODY_MAX_RATIO: f64 = 0.3;
const MARUBOZU_MIN_RATIO: f64 = 0.8;

/// Candlestick shape taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlestickType {
    Doji,
    Hammer,
    ShootingStar,
    /// Two-bar pattern.  Part of the taxonomy but never produced by the
    /// single-bar classifier.
    BullishEngulfing,
    /// Two-bar pattern.  Part of the taxonomy but never produced by the
    /// single-bar classifier.
    BearishEngulfing,
    SpinningTop,
    Marubozu,
    Normal,
}

impl std::fmt::Display for CandlestickType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Doji => write!(f, "doji"),
            Self::Hammer => write!(f, "hammer"),
            Self::ShootingStar => write!(f, "shooting_star"),
            Self::BullishEngulfing => write!(f, "bullish_engulfing"),
            Self::BearishEngulfing => write!(f, "bearish_engulfing"),
            Self::SpinningTop => write!(f, "spinning_top"),
            Self::Marubozu => write!(f, "marubozu"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Shape metrics and classification of one intraday bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickPattern {
    pub time_slot: String,
    #[serde(rename = "type")]
    pub pattern_type: CandlestickType,
    pub body_size: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    pub body_ratio: f64,
    pub description: &'static str,
    /// `close > open`.
    pub bullish: bool,
}

/// Pattern counts over a session.  `bullish` / `bearish` only count bars
/// that fell through to `Normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickSummary {
    pub doji: usize,
    pub hammer: usize,
    pub shooting_star: usize,
    pub spinning_top: usize,
    pub marubozu: usize,
    pub bullish: usize,
    pub bearish: usize,
}

/// Classify a single bar.
pub fn classify_bar(bar: &IntradayBar) -> CandlestickPattern {
    let body_size = (bar.close - bar.open).abs();
    let total_range = bar.high - bar.low;
    let upper_shadow = bar.high - bar.open.max(bar.close);
    let lower_shadow = bar.open.min(bar.close) - bar.low;
    let body_ratio = if total_range > 0.0 {
        body_size / total_range
    } else {
        0.0
    };
    let bullish = bar.close > bar.open;
    let small_body = body_ratio < SMALL_BODY_MAX_RATIO;

    let (pattern_type, description) = if body_ratio < DOJI_MAX_RATIO {
        (CandlestickType::Doji, "Doji - indecision, potential reversal")
    } else if small_body && lower_shadow > body_size * 2.0 && upper_shadow < body_size * 0.5 {
        (CandlestickType::Hammer, "Hammer - bullish reversal signal")
    } else if small_body && upper_shadow > body_size * 2.0 && lower_shadow < body_size * 0.5 {
        (CandlestickType::ShootingStar, "Shooting Star - bearish reversal signal")
    } else if small_body && upper_shadow > body_size && lower_shadow > body_size {
        (CandlestickType::SpinningTop, "Spinning Top - indecision")
    } else if body_ratio > MARUBOZU_MIN_RATIO {
        (CandlestickType::Marubozu, "Marubozu - strong trend continuation")
    } else if body_size > 0.0 {
        let description = if bullish {
            "Bullish candlestick"
        } else {
            "Bearish candlestick"
        };
        (CandlestickType::Normal, description)
    } else {
        (CandlestickType::Normal, "Normal candlestick")
    };

    CandlestickPattern {
        time_slot: bar.time_slot.clone(),
        pattern_type,
        body_size,
        upper_shadow,
        lower_shadow,
        body_ratio,
        description,
        bullish,
    }
}

/// Classify every bar of a session, preserving input order.
pub fn analyze_candlestick_patterns(bars: &[IntradayBar]) -> Vec<CandlestickPattern> {
    bars.iter().map(classify_bar).collect()
}

/// Count patterns by type.
pub fn candlestick_summary(patterns: &[CandlestickPattern]) -> CandlestickSummary {
    patterns
        .iter()
        .fold(CandlestickSummary::default(), |mut summary, p| {
            match p.pattern_type {
                CandlestickType::Doji => summary.doji += 1,
                CandlestickType::Hammer => summary.hammer += 1,
                CandlestickType::ShootingStar => summary.shooting_star += 1,
                CandlestickType::SpinningTop => summary.spinning_top += 1,
                CandlestickType::Marubozu => summary.marubozu += 1,
                CandlestickType::Normal if p.body_size > 0.0 => {
                    if p.bullish {
                        summary.bullish += 1;
                    } else {
                        summary.bearish += 1;
                    }
                }
                CandlestickType::Normal
                | CandlestickType::BullishEngulfing
                | CandlestickType::BearishEngulfing => {}
            }
            summary
        })
}
