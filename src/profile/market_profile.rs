// =============================================================================
// Market Profile: volume-at-price analysis of one intraday session
// =============================================================================
//
// 1. Bucketing      - every bar's close is rounded to the nearest tick and its
//                     volume, bar count and time label accumulate there.
// 2. POC            - bucket with the most volume.  Buckets are scanned from
//                     the highest price down and the first maximum wins.
// 3. Value area     - target = total volume * 70%.  Two independent scans,
//                     both anchored at the POC:
//                       up   (price >= POC, ascending)  -> value-area high
//                       down (price <= POC, descending) -> value-area low
//                     Each scan keeps the last bucket whose running total is
//                     still <= target.  The two halves are NOT a single 70%
//                     expansion around the POC.
// 4. Tails          - frequency == 1 buckets above the POC are poor highs,
//                     below it poor lows, the POC itself a plain single print.
//                     Each bucket lands in at most one list.
// 5. Profile type   - ratio = value-area width / session range:
//                       ratio < 0.3                      -> trend
//                       ratio > 0.7                      -> neutral
//                       > 3 poor highs or > 3 poor lows  -> double
//                       otherwise                        -> normal
//
// A zero-width session makes the ratio non-finite, so neither ratio rule
// fires and the poor-count rule decides.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::indicators::round_half_up;
use crate::market_data::IntradayBar;
use crate::profile::candlestick::{analyze_candlestick_patterns, CandlestickPattern};

// =============================================================================
// Parameters
// =============================================================================

fn default_tick_size() -> f64 {
    0.25
}

fn default_value_area_pct() -> f64 {
    0.7
}

fn default_trend_ratio() -> f64 {
    0.3
}

fn default_neutral_ratio() -> f64 {
    0.7
}

fn default_double_poor_count() -> usize {
    3
}

/// Tunable thresholds of the profile builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileParams {
    /// Price bucket width.
    #[serde(default = "default_tick_size")]
    pub tick_size: f64,

    /// Fraction of total session volume each value-area scan may absorb.
    #[serde(default = "default_value_area_pct")]
    pub value_area_pct: f64,

    /// Value-area / range ratio below which the session is a trend day.
    #[serde(default = "default_trend_ratio")]
    pub trend_ratio: f64,

    /// Value-area / range ratio above which the session is neutral.
    #[serde(default = "default_neutral_ratio")]
    pub neutral_ratio: f64,

    /// More poor highs (or lows) than this marks a double distribution.
    #[serde(default = "default_double_poor_count")]
    pub double_poor_count: usize,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            tick_size: default_tick_size(),
            value_area_pct: default_value_area_pct(),
            trend_ratio: default_trend_ratio(),
            neutral_ratio: default_neutral_ratio(),
            double_poor_count: default_double_poor_count(),
        }
    }
}

impl ProfileParams {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.tick_size.is_finite() && self.tick_size > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "tick_size must be positive, got {}",
                self.tick_size
            )));
        }
        if !(self.value_area_pct > 0.0 && self.value_area_pct <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "value_area_pct must be in (0, 1], got {}",
                self.value_area_pct
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Types
// =============================================================================

/// Session shape classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Normal,
    Double,
    Trend,
    Neutral,
}

impl std::fmt::Display for ProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Double => write!(f, "double"),
            Self::Trend => write!(f, "trend"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// One price bucket of the volume-at-price histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevel {
    pub price: f64,
    pub volume: u64,
    pub frequency: usize,
    pub time_slots: Vec<String>,
    pub is_poor_high: bool,
    pub is_poor_low: bool,
    pub is_single_print: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueArea {
    pub high: f64,
    pub low: f64,
}

/// Compact histogram row, highest price first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeNode {
    pub price: f64,
    pub volume: u64,
    pub frequency: usize,
}

/// Full market profile of one session.  Computed fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketProfileAnalysis {
    pub point_of_control: f64,
    pub value_area: ValueArea,
    pub poor_highs: Vec<PriceLevel>,
    pub poor_lows: Vec<PriceLevel>,
    pub single_prints: Vec<PriceLevel>,
    pub profile_type: ProfileType,
    pub candlestick_patterns: Vec<CandlestickPattern>,
    pub volume_profile: Vec<VolumeNode>,
}

/// Headline numbers of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub first_price: f64,
    pub last_price: f64,
    pub bar_count: usize,
}

impl SessionStats {
    /// `None` for an empty session.
    pub fn from_bars(bars: &[IntradayBar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;
        let (high, low) = session_extremes(bars);
        Some(Self {
            high,
            low,
            volume: bars.iter().map(|b| b.volume).sum(),
            first_price: first.open,
            last_price: last.close,
            bar_count: bars.len(),
        })
    }
}

// =============================================================================
// Building blocks
// =============================================================================

#[derive(Default)]
struct Bucket {
    volume: u64,
    frequency: usize,
    time_slots: Vec<String>,
}

/// Bucket every close to the nearest `tick_size` and accumulate volume,
/// frequency and time labels.  Returned highest price first, all tail flags
/// cleared.
pub fn build_price_levels(bars: &[IntradayBar], tick_size: f64) -> Vec<PriceLevel> {
    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();

    for bar in bars {
        let ticks = round_half_up(bar.close / tick_size) as i64;
        let bucket = buckets.entry(ticks).or_default();
        bucket.volume += bar.volume;
        bucket.frequency += 1;
        bucket.time_slots.push(bar.time_slot.clone());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(ticks, b)| PriceLevel {
            price: ticks as f64 * tick_size,
            volume: b.volume,
            frequency: b.frequency,
            time_slots: b.time_slots,
            is_poor_high: false,
            is_poor_low: false,
            is_single_print: false,
        })
        .collect()
}

/// Price of the highest-volume level.  `levels` must be sorted highest price
/// first; on ties the first (highest-priced) level wins.
pub fn point_of_control(levels: &[PriceLevel]) -> Option<f64> {
    let mut best: Option<&PriceLevel> = None;
    for level in levels {
        match best {
            Some(b) if level.volume <= b.volume => {}
            _ => best = Some(level),
        }
    }
    best.map(|l| l.price)
}

/// Two one-sided value-area scans anchored at `poc`.
pub fn value_area(levels: &[PriceLevel], poc: f64, value_area_pct: f64) -> ValueArea {
    let total: u64 = levels.iter().map(|l| l.volume).sum();
    let target = total as f64 * value_area_pct;

    // `levels` is highest-first, so the upward scan walks it in reverse.
    let mut high = poc;
    let mut cumulative = 0u64;
    for level in levels.iter().rev().filter(|l| l.price >= poc) {
        cumulative += level.volume;
        if cumulative as f64 <= target {
            high = level.price;
        }
    }

    let mut low = poc;
    cumulative = 0;
    for level in levels.iter().filter(|l| l.price <= poc) {
        cumulative += level.volume;
        if cumulative as f64 <= target {
            low = level.price;
        }
    }

    ValueArea { high, low }
}

/// Split the single-frequency levels into poor highs, poor lows and plain
/// single prints, setting the flags on each copy.
pub fn classify_tails(
    levels: &[PriceLevel],
    poc: f64,
) -> (Vec<PriceLevel>, Vec<PriceLevel>, Vec<PriceLevel>) {
    let mut poor_highs = Vec::new();
    let mut poor_lows = Vec::new();
    let mut single_prints = Vec::new();

    for level in levels.iter().filter(|l| l.frequency == 1) {
        let mut tagged = level.clone();
        tagged.is_single_print = true;
        if level.price > poc {
            tagged.is_poor_high = true;
            poor_highs.push(tagged);
        } else if level.price < poc {
            tagged.is_poor_low = true;
            poor_lows.push(tagged);
        } else {
            single_prints.push(tagged);
        }
    }

    (poor_highs, poor_lows, single_prints)
}

/// Classify the session shape from its value area, range and tail counts.
pub fn classify_profile(
    value_area: ValueArea,
    day_high: f64,
    day_low: f64,
    poor_highs: usize,
    poor_lows: usize,
    params: &ProfileParams,
) -> ProfileType {
    let day_range = day_high - day_low;
    let ratio = (value_area.high - value_area.low) / day_range;

    if ratio < params.trend_ratio {
        ProfileType::Trend
    } else if ratio > params.neutral_ratio {
        ProfileType::Neutral
    } else if poor_highs > params.double_poor_count || poor_lows > params.double_poor_count {
        ProfileType::Double
    } else {
        ProfileType::Normal
    }
}

fn session_extremes(bars: &[IntradayBar]) -> (f64, f64) {
    bars.iter().fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), b| {
        (hi.max(b.high), lo.min(b.low))
    })
}

// =============================================================================
// Entry points
// =============================================================================

/// Market profile of one session with the default parameters.
///
/// Fails with [`EngineError::EmptySession`] when `bars` is empty; every other
/// input produces a result.
pub fn calculate_market_profile(bars: &[IntradayBar]) -> EngineResult<MarketProfileAnalysis> {
    calculate_market_profile_with(bars, &ProfileParams::default())
}

/// Market profile of one session.  The caller guarantees all bars belong to
/// the same trading day.
pub fn calculate_market_profile_with(
    bars: &[IntradayBar],
    params: &ProfileParams,
) -> EngineResult<MarketProfileAnalysis> {
    params.validate()?;
    if bars.is_empty() {
        return Err(EngineError::EmptySession);
    }

    let levels = build_price_levels(bars, params.tick_size);
    let poc = point_of_control(&levels).ok_or(EngineError::EmptySession)?;
    let value_area = value_area(&levels, poc, params.value_area_pct);
    let (poor_highs, poor_lows, single_prints) = classify_tails(&levels, poc);

    let (day_high, day_low) = session_extremes(bars);
    let profile_type = classify_profile(
        value_area,
        day_high,
        day_low,
        poor_highs.len(),
        poor_lows.len(),
        params,
    );

    let volume_profile = levels
        .iter()
        .map(|l| VolumeNode {
            price: l.price,
            volume: l.volume,
            frequency: l.frequency,
        })
        .collect();

    debug!(
        bars = bars.len(),
        levels = levels.len(),
        poc,
        vah = value_area.high,
        val = value_area.low,
        poor_highs = poor_highs.len(),
        poor_lows = poor_lows.len(),
        profile_type = %profile_type,
        "market profile complete"
    );

    Ok(MarketProfileAnalysis {
        point_of_control: poc,
        value_area,
        poor_highs,
        poor_lows,
        single_prints,
        profile_type,
        candlestick_patterns: analyze_candlestick_patterns(bars),
        volume_profile,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Flat bar at `price` (open = high = low = close).
    fn print(slot: &str, price: f64, volume: u64) -> IntradayBar {
        IntradayBar::new(slot, price, price, price, price, volume)
    }

    fn level(price: f64, volume: u64, frequency: usize) -> PriceLevel {
        PriceLevel {
            price,
            volume,
            frequency,
            time_slots: Vec::new(),
            is_poor_high: false,
            is_poor_low: false,
            is_single_print: false,
        }
    }

    // ---- bucketing -------------------------------------------------------

    #[test]
    fn closes_round_to_nearest_quarter() {
        let bars = vec![
            print("09:30", 100.1, 10),
            print("09:35", 100.13, 20),
            print("09:40", 100.12, 5),
            print("09:45", 99.9, 1),
        ];
        let levels = build_price_levels(&bars, 0.25);
        let prices: Vec<f64> = levels.iter().map(|l| l.price).collect();
        // 100.1 -> 100.0, 100.13 -> 100.25, 100.12 -> 100.0, 99.9 -> 100.0
        assert_eq!(prices, vec![100.25, 100.0]);
        assert_eq!(levels[1].volume, 16);
        assert_eq!(levels[1].frequency, 3);
        assert_eq!(levels[1].time_slots, vec!["09:30", "09:40", "09:45"]);
    }

    #[test]
    fn exact_half_tick_rounds_up() {
        let levels = build_price_levels(&[print("a", 100.125, 1)], 0.25);
        assert_eq!(levels[0].price, 100.25);
    }

    #[test]
    fn bucketing_conserves_volume() {
        let bars: Vec<IntradayBar> = (0..40)
            .map(|i| print("t", 4500.0 + (i as f64 * 0.37).sin() * 4.0, 100 + i))
            .collect();
        let levels = build_price_levels(&bars, 0.25);
        let bucketed: u64 = levels.iter().map(|l| l.volume).sum();
        let raw: u64 = bars.iter().map(|b| b.volume).sum();
        assert_eq!(bucketed, raw);
    }

    // ---- POC -------------------------------------------------------------

    #[test]
    fn poc_is_max_volume_level() {
        let levels = vec![level(102.0, 10, 1), level(101.0, 50, 2), level(100.0, 20, 1)];
        assert_eq!(point_of_control(&levels), Some(101.0));
    }

    #[test]
    fn poc_tie_prefers_highest_price() {
        let levels = vec![level(102.0, 30, 1), level(101.0, 30, 1), level(100.0, 5, 1)];
        assert_eq!(point_of_control(&levels), Some(102.0));
        assert_eq!(point_of_control(&[]), None);
    }

    // ---- value area ------------------------------------------------------

    #[test]
    fn value_area_scans_are_independent() {
        // total 100 -> target 70.
        // up from POC:   100 (50) -> 50, 101 (10) -> 60, 102 (10) -> 70  => VAH 102
        // down from POC: 100 (50) -> 50,  99 (15) -> 65,  98 (15) -> 80  => VAL 99
        let levels = vec![
            level(102.0, 10, 1),
            level(101.0, 10, 1),
            level(100.0, 50, 5),
            level(99.0, 15, 2),
            level(98.0, 15, 2),
        ];
        let va = value_area(&levels, 100.0, 0.7);
        assert_eq!(va, ValueArea { high: 102.0, low: 99.0 });
    }

    #[test]
    fn value_area_collapses_to_poc_when_poc_exceeds_target() {
        let levels = vec![level(101.0, 5, 1), level(100.0, 90, 3), level(99.0, 5, 1)];
        let va = value_area(&levels, 100.0, 0.7);
        assert_eq!(va, ValueArea { high: 100.0, low: 100.0 });
    }

    // ---- tails -----------------------------------------------------------

    #[test]
    fn tails_are_mutually_exclusive() {
        let levels = vec![
            level(103.0, 1, 1),
            level(102.0, 9, 3),
            level(101.0, 50, 1),
            level(100.0, 2, 1),
        ];
        let (highs, lows, singles) = classify_tails(&levels, 101.0);
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].price, 103.0);
        assert!(highs[0].is_poor_high && highs[0].is_single_print && !highs[0].is_poor_low);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].price, 100.0);
        assert!(lows[0].is_poor_low && !lows[0].is_poor_high);
        // The POC printed once: a plain single print.
        assert_eq!(singles.len(), 1);
        assert_eq!(singles[0].price, 101.0);
        assert!(singles[0].is_single_print && !singles[0].is_poor_high && !singles[0].is_poor_low);
    }

    // ---- classification --------------------------------------------------

    #[test]
    fn profile_type_rules_in_order() {
        let p = ProfileParams::default();
        let va = |h, l| ValueArea { high: h, low: l };
        assert_eq!(classify_profile(va(101.0, 100.0), 110.0, 100.0, 9, 9, &p), ProfileType::Trend);
        assert_eq!(classify_profile(va(108.0, 100.0), 110.0, 100.0, 9, 9, &p), ProfileType::Neutral);
        assert_eq!(classify_profile(va(105.0, 100.0), 110.0, 100.0, 4, 0, &p), ProfileType::Double);
        assert_eq!(classify_profile(va(105.0, 100.0), 110.0, 100.0, 0, 4, &p), ProfileType::Double);
        assert_eq!(classify_profile(va(105.0, 100.0), 110.0, 100.0, 3, 3, &p), ProfileType::Normal);
    }

    #[test]
    fn zero_range_session_falls_through_ratio_rules() {
        let p = ProfileParams::default();
        let va = ValueArea { high: 100.0, low: 100.0 };
        assert_eq!(classify_profile(va, 100.0, 100.0, 0, 0, &p), ProfileType::Normal);
    }

    // ---- entry points ----------------------------------------------------

    #[test]
    fn empty_session_is_an_error() {
        assert_eq!(calculate_market_profile(&[]), Err(EngineError::EmptySession));
    }

    #[test]
    fn bad_tick_is_rejected() {
        let params = ProfileParams {
            tick_size: 0.0,
            ..ProfileParams::default()
        };
        let err = calculate_market_profile_with(&[print("a", 1.0, 1)], &params).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn single_bar_session() {
        let analysis = calculate_market_profile(&[print("09:30", 4500.0, 1_000)]).unwrap();
        assert_eq!(analysis.point_of_control, 4500.0);
        assert_eq!(analysis.value_area, ValueArea { high: 4500.0, low: 4500.0 });
        assert!(analysis.poor_highs.is_empty());
        assert!(analysis.poor_lows.is_empty());
        assert_eq!(analysis.single_prints.len(), 1);
        assert_eq!(analysis.candlestick_patterns.len(), 1);
        assert_eq!(analysis.profile_type, ProfileType::Normal);
    }

    #[test]
    fn heavy_price_becomes_poc_and_rest_are_tails() {
        let mut bars = vec![
            print("09:30", 101.0, 10),
            print("09:35", 100.5, 10),
            print("09:40", 99.5, 10),
            print("09:45", 99.0, 10),
        ];
        for slot in ["10:00", "10:05", "10:10", "10:15", "10:20"] {
            bars.push(print(slot, 100.0, 200));
        }
        let analysis = calculate_market_profile(&bars).unwrap();
        assert_eq!(analysis.point_of_control, 100.0);
        let highs: Vec<f64> = analysis.poor_highs.iter().map(|l| l.price).collect();
        let lows: Vec<f64> = analysis.poor_lows.iter().map(|l| l.price).collect();
        assert_eq!(highs, vec![101.0, 100.5]);
        assert_eq!(lows, vec![99.5, 99.0]);
        assert!(analysis.single_prints.is_empty());
        assert_eq!(analysis.volume_profile.len(), 5);
        assert_eq!(analysis.volume_profile[2].frequency, 5);
    }

    #[test]
    fn session_stats() {
        let bars = vec![
            IntradayBar::new("09:30", 100.0, 102.0, 99.0, 101.0, 10),
            IntradayBar::new("09:35", 101.0, 104.0, 100.5, 103.5, 15),
        ];
        let stats = SessionStats::from_bars(&bars).unwrap();
        assert_eq!(stats.high, 104.0);
        assert_eq!(stats.low, 99.0);
        assert_eq!(stats.volume, 25);
        assert_eq!(stats.first_price, 100.0);
        assert_eq!(stats.last_price, 103.5);
        assert!(SessionStats::from_bars(&[]).is_none());
    }
}
