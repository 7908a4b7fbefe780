// =============================================================================
// Gap, Range and Previous-Day Level Analysis
// =============================================================================
//
// Per-session analytics shown next to every daily bar:
//
//   gap points        = open - prevClose
//   gap fill          = did the session trade back through prevClose?
//   RTH range         = high - low
//   point neg. open   = open - low      (how far price fell below the open)
//   point pos. open   = high - open     (how far price rose above the open)
//   above PDH         = high > previous day's high
//   below PDL         = low  < previous day's low
//
// Day-of-week comes from the calendar date alone, so no timezone can shift it.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::indicators::round2;
use crate::market_data::{chronological, Bar};

// =============================================================================
// Types
// =============================================================================

/// Whether an opening gap was filled during the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapFill {
    /// No gap, or price traded back to the previous close.
    Filled,
    /// Price never reached the previous close; `points_left` is the
    /// remaining distance.
    Unfilled { points_left: f64 },
}

impl fmt::Display for GapFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => write!(f, "Yes"),
            Self::Unfilled { points_left } => write!(f, "No ({points_left:.2} points left)"),
        }
    }
}

/// Whether the session broke the previous day's high (or low).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelBreak {
    No,
    Above { points: f64 },
    Below { points: f64 },
}

impl fmt::Display for LevelBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::No => write!(f, "No"),
            Self::Above { points } => write!(f, "Yes ({points:.2} points up)"),
            Self::Below { points } => write!(f, "Yes ({points:.2} points down)"),
        }
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// A daily bar annotated with its gap, range and level analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedBar {
    #[serde(flatten)]
    pub bar: Bar,
    pub gap_points: f64,
    #[serde(serialize_with = "serialize_display")]
    pub gap_fill: GapFill,
    pub day_of_week: &'static str,
    pub rth_range: f64,
    pub point_negative_open: f64,
    pub point_positive_open: f64,
    #[serde(rename = "abovePDH", serialize_with = "serialize_display")]
    pub above_pdh: LevelBreak,
    #[serde(rename = "belowPDL", serialize_with = "serialize_display")]
    pub below_pdl: LevelBreak,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_day_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_day_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_day_close: Option<f64>,
}

// =============================================================================
// Gap analytics
// =============================================================================

/// Opening gap versus the previous close, rounded to 2 decimals.
pub fn calculate_gap_points(open: f64, prev_close: f64) -> f64 {
    round2(open - prev_close)
}

/// Classify whether the gap was filled.
///
/// A zero gap always counts as filled.  An up gap is filled once the low
/// reaches `prev_close`; a down gap once the high does.
pub fn calculate_gap_fill(gap_points: f64, day_low: f64, day_high: f64, prev_close: f64) -> GapFill {
    if gap_points == 0.0 {
        return GapFill::Filled;
    }

    if gap_points > 0.0 {
        if day_low <= prev_close {
            GapFill::Filled
        } else {
            GapFill::Unfilled {
                points_left: round2(day_low - prev_close),
            }
        }
    } else if day_high >= prev_close {
        GapFill::Filled
    } else {
        GapFill::Unfilled {
            points_left: round2(prev_close - day_high),
        }
    }
}

// =============================================================================
// Range and level analytics
// =============================================================================

pub fn calculate_rth_range(high: f64, low: f64) -> f64 {
    round2(high - low)
}

pub fn calculate_point_negative_open(open: f64, low: f64) -> f64 {
    round2(open - low)
}

pub fn calculate_point_positive_open(open: f64, high: f64) -> f64 {
    round2(high - open)
}

/// `Above` when today's high exceeds the previous day's high.
pub fn calculate_above_pdh(day_high: f64, prev_day_high: f64) -> LevelBreak {
    if day_high > prev_day_high {
        LevelBreak::Above {
            points: round2(day_high - prev_day_high),
        }
    } else {
        LevelBreak::No
    }
}

/// `Below` when today's low undercuts the previous day's low.
pub fn calculate_below_pdl(day_low: f64, prev_day_low: f64) -> LevelBreak {
    if day_low < prev_day_low {
        LevelBreak::Below {
            points: round2(prev_day_low - day_low),
        }
    } else {
        LevelBreak::No
    }
}

/// English day name of a calendar date.
pub fn day_of_week(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

// =============================================================================
// Per-bar enrichment
// =============================================================================

/// Annotate every bar with gap/range/level analytics, returned oldest-first.
///
/// The earliest bar has no previous session: its gap is 0 (filled) and both
/// level breaks are `No`.
pub fn enhance_daily_bars(bars: &[Bar]) -> Vec<EnrichedBar> {
    let ordered = chronological(bars);
    let mut out = Vec::with_capacity(ordered.len());

    for (i, &bar) in ordered.iter().enumerate() {
        let prev = if i > 0 { Some(ordered[i - 1]) } else { None };

        let (gap_points, gap_fill, above_pdh, below_pdl) = match prev {
            Some(p) => {
                let gap = calculate_gap_points(bar.open, p.close);
                (
                    gap,
                    calculate_gap_fill(gap, bar.low, bar.high, p.close),
                    calculate_above_pdh(bar.high, p.high),
                    calculate_below_pdl(bar.low, p.low),
                )
            }
            None => (0.0, GapFill::Filled, LevelBreak::No, LevelBreak::No),
        };

        out.push(EnrichedBar {
            bar: bar.clone(),
            gap_points,
            gap_fill,
            day_of_week: day_of_week(bar.date),
            rth_range: calculate_rth_range(bar.high, bar.low),
            point_negative_open: calculate_point_negative_open(bar.open, bar.low),
            point_positive_open: calculate_point_positive_open(bar.open, bar.high),
            above_pdh,
            below_pdl,
            prev_day_high: prev.map(|p| p.high),
            prev_day_low: prev.map(|p| p.low),
            prev_day_close: prev.map(|p| p.close),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ---- gap -------------------------------------------------------------

    #[test]
    fn zero_gap_is_always_filled() {
        assert_eq!(calculate_gap_fill(0.0, 500.0, 510.0, 100.0), GapFill::Filled);
        assert_eq!(calculate_gap_fill(0.0, 50.0, 60.0, 100.0).to_string(), "Yes");
    }

    #[test]
    fn up_gap_filled_when_low_crosses_prev_close() {
        let prev_close = 100.0;
        let gap = calculate_gap_points(105.0, prev_close);
        assert_eq!(gap, 5.0);
        assert_eq!(calculate_gap_fill(gap, 99.0, 108.0, prev_close), GapFill::Filled);
        assert_eq!(calculate_gap_fill(gap, 100.0, 108.0, prev_close), GapFill::Filled);
    }

    #[test]
    fn up_gap_unfilled_reports_points_left() {
        let fill = calculate_gap_fill(5.0, 102.0, 108.0, 100.0);
        assert_eq!(fill, GapFill::Unfilled { points_left: 2.0 });
        assert_eq!(fill.to_string(), "No (2.00 points left)");
    }

    #[test]
    fn down_gap_uses_day_high() {
        assert_eq!(calculate_gap_fill(-4.0, 90.0, 100.5, 100.0), GapFill::Filled);
        let fill = calculate_gap_fill(-4.0, 90.0, 97.25, 100.0);
        assert_eq!(fill.to_string(), "No (2.75 points left)");
    }

    #[test]
    fn gap_points_round_to_cents() {
        assert_eq!(calculate_gap_points(4501.256, 4500.0), 1.26);
        assert_eq!(calculate_gap_points(99.5, 100.0), -0.5);
    }

    // ---- levels ----------------------------------------------------------

    #[test]
    fn range_and_open_distances() {
        assert_eq!(calculate_rth_range(4520.75, 4480.5), 40.25);
        assert_eq!(calculate_point_negative_open(4500.0, 4480.5), 19.5);
        assert_eq!(calculate_point_positive_open(4500.0, 4520.75), 20.75);
    }

    #[test]
    fn pdh_and_pdl_breaks() {
        assert_eq!(calculate_above_pdh(105.5, 100.0).to_string(), "Yes (5.50 points up)");
        assert_eq!(calculate_above_pdh(100.0, 100.0), LevelBreak::No);
        assert_eq!(calculate_below_pdl(97.0, 100.0).to_string(), "Yes (3.00 points down)");
        assert_eq!(calculate_below_pdl(101.0, 100.0).to_string(), "No");
    }

    #[test]
    fn day_of_week_is_calendar_based() {
        assert_eq!(day_of_week(date(2024, 1, 1)), "Monday");
        assert_eq!(day_of_week(date(2024, 3, 3)), "Sunday");
        assert_eq!(day_of_week(date(2000, 2, 29)), "Tuesday");
    }

    // ---- enrichment ------------------------------------------------------

    #[test]
    fn enhance_annotates_relative_to_previous_session() {
        let bars = vec![
            Bar::new(date(2024, 1, 3), 105.0, 108.0, 102.0, 107.0, 10),
            Bar::new(date(2024, 1, 2), 99.0, 101.0, 98.0, 100.0, 10),
        ];
        let out = enhance_daily_bars(&bars);
        assert_eq!(out.len(), 2);

        let first = &out[0];
        assert_eq!(first.bar.date, date(2024, 1, 2));
        assert_eq!(first.gap_points, 0.0);
        assert_eq!(first.gap_fill, GapFill::Filled);
        assert_eq!(first.above_pdh, LevelBreak::No);
        assert!(first.prev_day_close.is_none());

        let second = &out[1];
        assert_eq!(second.day_of_week, "Wednesday");
        assert_eq!(second.gap_points, 5.0);
        assert_eq!(second.gap_fill.to_string(), "No (2.00 points left)");
        assert_eq!(second.above_pdh.to_string(), "Yes (7.00 points up)");
        assert_eq!(second.below_pdl, LevelBreak::No);
        assert_eq!(second.rth_range, 6.0);
        assert_eq!(second.point_negative_open, 3.0);
        assert_eq!(second.point_positive_open, 3.0);
        assert_eq!(second.prev_day_close, Some(100.0));
    }

    #[test]
    fn enriched_bar_serialises_display_strings() {
        let bars = vec![
            Bar::new(date(2024, 1, 2), 99.0, 101.0, 98.0, 100.0, 10),
            Bar::new(date(2024, 1, 3), 105.0, 108.0, 102.0, 107.0, 10),
        ];
        let out = enhance_daily_bars(&bars);
        let json = serde_json::to_value(&out[1]).unwrap();
        assert_eq!(json["gapFill"], "No (2.00 points left)");
        assert_eq!(json["abovePDH"], "Yes (7.00 points up)");
        assert_eq!(json["belowPDL"], "No");
        assert_eq!(json["dayOfWeek"], "Wednesday");
        assert_eq!(json["date"], "2024-01-03");
        assert_eq!(json["prevDayHigh"], 101.0);
    }
}
