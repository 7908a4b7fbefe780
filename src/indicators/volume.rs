// =============================================================================
// Volume Simple Moving Average
// =============================================================================

use crate::indicators::round_half_up;
use crate::market_data::{chronological, Bar};

/// Mean volume of the most recent `period` bars, rounded to a whole share
/// count.  `None` when `period` is zero or history is short.
pub fn calculate_volume_sma(bars: &[Bar], period: usize) -> Option<u64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let ordered = chronological(bars);
    let recent = &ordered[ordered.len() - period..];
    let total: u64 = recent.iter().map(|b| b.volume).sum();
    let avg = total as f64 / period as f64;

    Some(round_half_up(avg) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_volumes(volumes: &[u64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::new(start + chrono::Days::new(i as u64), 1.0, 1.0, 1.0, 1.0, v))
            .collect()
    }

    #[test]
    fn volume_sma_rounds_to_integer() {
        // Last 2 volumes: 3 + 4 => 3.5 => 4
        let bars = bars_from_volumes(&[1_000, 3, 4]);
        assert_eq!(calculate_volume_sma(&bars, 2), Some(4));
        // (1000 + 3 + 4) / 3 = 335.67 => 336
        assert_eq!(calculate_volume_sma(&bars, 3), Some(336));
    }

    #[test]
    fn volume_sma_insufficient_data() {
        let bars = bars_from_volumes(&[10; 19]);
        assert!(calculate_volume_sma(&bars, 20).is_none());
        assert!(calculate_volume_sma(&bars, 0).is_none());
    }

    #[test]
    fn volume_sma_order_invariant() {
        let mut bars = bars_from_volumes(&[5, 10, 20, 40]);
        let forward = calculate_volume_sma(&bars, 2);
        bars.reverse();
        assert_eq!(forward, calculate_volume_sma(&bars, 2));
        assert_eq!(forward, Some(30));
    }
}
