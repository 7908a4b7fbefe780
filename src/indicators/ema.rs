// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the *oldest* `period`
// closes and the recurrence then walks forward to the newest bar.  The result
// therefore depends on the full history supplied: a truncated window gives a
// different value.  Callers must pass everything they have.
// =============================================================================

use crate::indicators::round2;
use crate::market_data::{chronological, Bar};

/// Compute the EMA series for the given oldest-first `closes` and `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => empty vec (division by zero guard)
/// - `closes.len() < period` => empty vec
/// - A non-finite intermediate value truncates the series.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(sma);

    let mut prev_ema = sma;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// Most recent EMA value over the full supplied history, rounded to
/// 2 decimals.  Bars may arrive in any order.
///
/// Returns `None` when `period` is zero, there are fewer than `period` bars,
/// or the recurrence became non-finite before reaching the newest bar.
pub fn calculate_ema(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let closes: Vec<f64> = chronological(bars).iter().map(|b| b.close).collect();
    let series = ema_series(&closes, period);

    // A truncated series means a non-finite value was hit mid-way.
    if series.len() != closes.len() - period + 1 {
        return None;
    }

    series.last().map(|&ema| round2(ema))
}
