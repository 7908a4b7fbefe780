// =============================================================================
// Simple and Weighted Moving Averages (SMA / WMA)
// =============================================================================
//
// Both averages look at the `period` most recent closes (newest-first).
//
//   SMA = sum(close_i) / period
//   WMA = sum(w_i * close_i) / sum(w_i),  w = period for the newest bar,
//                                          1 for the oldest in the window
// =============================================================================

use crate::indicators::round2;
use crate::market_data::{newest_first, Bar};

/// Mean of the `period` most recent closes, rounded to 2 decimals.
///
/// Returns `None` when `period` is zero or there are fewer than `period` bars.
pub fn calculate_sma(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let recent = newest_first(bars);
    let sum: f64 = recent[..period].iter().map(|b| b.close).sum();
    let sma = sum / period as f64;

    sma.is_finite().then(|| round2(sma))
}

/// Linearly weighted mean of the `period` most recent closes, rounded to
/// 2 decimals.  The newest close carries weight `period`.
pub fn calculate_wma(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let recent = newest_first(bars);
    let weighted: f64 = recent[..period]
        .iter()
        .enumerate()
        .map(|(i, b)| (period - i) as f64 * b.close)
        .sum();
    let weight_sum = (period * (period + 1) / 2) as f64;
    let wma = weighted / weight_sum;

    wma.is_finite().then(|| round2(wma))
}
