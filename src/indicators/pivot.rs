// =============================================================================
// Classic Floor Pivot Points
// =============================================================================
//
// Levels for the current session are derived from the previous session:
//   PP = (H + L + C) / 3
//   R1 = 2*PP - L        S1 = 2*PP - H
//   R2 = PP + (H - L)    S2 = PP - (H - L)

use serde::{Deserialize, Serialize};

use crate::indicators::round2;
use crate::market_data::{chronological, Bar};

/// Pivot levels for the newest session, each rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pp: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl PivotPoints {
    /// Compute pivot levels from a single session's high, low and close.
    pub fn from_session(high: f64, low: f64, close: f64) -> Self {
        let pp = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            pp: round2(pp),
            r1: round2(2.0 * pp - low),
            r2: round2(pp + range),
            s1: round2(2.0 * pp - high),
            s2: round2(pp - range),
        }
    }
}

/// Pivot levels for the newest bar, using the second-newest bar as the
/// previous session.  `None` with fewer than two bars.
pub fn calculate_pivot_points(bars: &[Bar]) -> Option<PivotPoints> {
    if bars.len() < 2 {
        return None;
    }

    let ordered = chronological(bars);
    let prev = ordered[ordered.len() - 2];
    Some(PivotPoints::from_session(prev.high, prev.low, prev.close))
}
