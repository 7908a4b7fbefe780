// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the daily indicators shown on the
// dashboard.  Every public function accepts bars in any order, normalises the
// ordering on a borrowed view, and returns `Option<T>` so callers are forced
// to handle insufficient history (`None` is rendered as `null`, never as an
// error).
//
// All monetary outputs are rounded to 2 decimals with `round2`.

pub mod atr;
pub mod ema;
pub mod pivot;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use atr::{calculate_adr, calculate_atr, true_range};
pub use ema::calculate_ema;
pub use pivot::{calculate_pivot_points, PivotPoints};
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, calculate_wma};
pub use volume::calculate_volume_sma;

/// Moving-average periods computed by default (both SMA and EMA).
pub const MOVING_AVERAGE_PERIODS: [usize; 12] = [5, 8, 10, 13, 20, 21, 34, 50, 55, 89, 100, 200];
pub const ATR_PERIOD: usize = 14;
pub const RSI_PERIOD: usize = 14;
pub const ADR_PERIOD: usize = 20;
pub const VOLUME_SMA_PERIOD: usize = 20;

/// Round half-up (towards +inf on ties), the rounding the dashboard uses for
/// every displayed value.  `f64::round` rounds ties away from zero, which
/// differs for negative values such as `-2.5`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to 2 decimals with half-up semantics.
pub fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}
