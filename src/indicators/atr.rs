// =============================================================================
// Average True Range (ATR) and Average Daily Range (ADR)
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the plain arithmetic mean of the last `period` TR values (no Wilder
// smoothing).  ADR is the mean of (H - L) over the last `period` bars and
// ignores gaps entirely.
//
// Default periods: ATR 14, ADR 20.
// =============================================================================

use crate::indicators::round2;
use crate::market_data::{chronological, Bar};

/// True Range of a single bar given the previous bar's close.
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// True Range series over the oldest-first ordering of `bars`, one value per
/// bar starting at the second.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    chronological(bars)
        .windows(2)
        .map(|w| true_range(w[1].high, w[1].low, w[0].close))
        .collect()
}

/// Mean of the last `period` True Range values, rounded to 2 decimals.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` bars (each TR needs a previous bar).
/// - The mean is non-finite.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let trs = true_ranges(bars);
    let recent = &trs[trs.len() - period..];
    let atr = recent.iter().sum::<f64>() / period as f64;

    atr.is_finite().then(|| round2(atr))
}

/// Mean of `high - low` over the most recent `period` bars, rounded to
/// 2 decimals.  `None` when `period` is zero or history is short.
pub fn calculate_adr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let ordered = chronological(bars);
    let recent = &ordered[ordered.len() - period..];
    let adr = recent.iter().map(|b| b.high - b.low).sum::<f64>() / period as f64;

    adr.is_finite().then(|| round2(adr))
}
