// =============================================================================
// Relative Strength Index (RSI): simple-average variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute close-to-close deltas in chronological order.
// Step 2: gain = max(delta, 0), loss = max(-delta, 0).
// Step 3: Average gain / average loss over the last `period` deltas
//         (plain mean, no Wilder smoothing).
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS), or exactly 100 when avg_loss == 0.
//
// Thresholds used by the presentation layer:  >= 70 overbought, <= 30 oversold.
// =============================================================================

use crate::indicators::round2;
use crate::market_data::{chronological, Bar};

/// Most recent RSI over `period` deltas, rounded to 2 decimals.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - fewer than `period + 1` bars => `None` (need `period` deltas)
/// - no losses in the window => exactly `100.0`, even for a flat window
pub fn calculate_rsi(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = chronological(bars)
        .windows(2)
        .map(|w| w[1].close - w[0].close)
        .collect();
    let recent = &deltas[deltas.len() - period..];

    let (sum_gain, sum_loss) = recent.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else if d < 0.0 {
            (g, l + d.abs())
        } else {
            (g, l)
        }
    });

    let period_f = period as f64;
    rsi_from_averages(sum_gain / period_f, sum_loss / period_f).map(round2)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If average loss is zero, RSI is 100.0 (this includes a flat window).
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + chrono::Days::new(i as u64), c, c, c, c, 0))
            .collect()
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&bars_from_closes(&[1.0, 2.0, 3.0]), 0).is_none());
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&bars_from_closes(&closes), 14).is_none());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert_eq!(calculate_rsi(&bars_from_closes(&closes), 14), Some(100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        assert_eq!(calculate_rsi(&bars_from_closes(&closes), 14), Some(0.0));
    }

    #[test]
    fn rsi_flat_market_is_100() {
        // No losses at all => 100, not the neutral 50 some variants report.
        let bars = bars_from_closes(&[100.0; 30]);
        assert_eq!(calculate_rsi(&bars, 14), Some(100.0));
    }

    #[test]
    fn rsi_known_value() {
        // Deltas: +2, -1, +2, -1 => avg gain 1.0, avg loss 0.5, RS 2 => 66.67
        let bars = bars_from_closes(&[10.0, 12.0, 11.0, 13.0, 12.0]);
        assert_eq!(calculate_rsi(&bars, 4), Some(66.67));
    }

    #[test]
    fn rsi_only_looks_at_recent_window() {
        // Early crash followed by a steady climb: window of 3 sees only gains.
        let bars = bars_from_closes(&[100.0, 50.0, 51.0, 52.0, 53.0]);
        assert_eq!(calculate_rsi(&bars, 3), Some(100.0));
        assert!(calculate_rsi(&bars, 4).unwrap() < 50.0);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let v = calculate_rsi(&bars_from_closes(&closes), 14).unwrap();
        assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
    }

    #[test]
    fn rsi_is_order_invariant() {
        let mut bars = bars_from_closes(&[10.0, 12.0, 11.0, 13.0, 12.0]);
        bars.reverse();
        assert_eq!(calculate_rsi(&bars, 4), Some(66.67));
    }
}
