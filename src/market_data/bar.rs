use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::round2;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single daily OHLCV bar as handed over by the data-fetch layer.
///
/// `change` / `change_percent` are relative to the chronologically previous
/// bar and are absent for the earliest bar of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            change: None,
            change_percent: None,
        }
    }
}

/// One fixed-length bar inside a single trading session (e.g. a 5-minute
/// bucket).  `time_slot` is an opaque label such as `"09:35"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayBar {
    pub time_slot: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl IntradayBar {
    pub fn new(time_slot: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time_slot: time_slot.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering helpers
// ---------------------------------------------------------------------------
//
// Callers never guarantee an ordering.  Every helper works on borrowed views
// and leaves the caller's slice untouched.  Sorts are stable, so bars sharing
// a date keep their relative input order.

/// Borrowed view of `bars` sorted oldest-first.
pub fn chronological(bars: &[Bar]) -> Vec<&Bar> {
    let mut view: Vec<&Bar> = bars.iter().collect();
    view.sort_by(|a, b| a.date.cmp(&b.date));
    view
}

/// Borrowed view of `bars` sorted newest-first.
pub fn newest_first(bars: &[Bar]) -> Vec<&Bar> {
    let mut view: Vec<&Bar> = bars.iter().collect();
    view.sort_by(|a, b| b.date.cmp(&a.date));
    view
}

/// Owned copy of `bars` sorted newest-first, the display order of the
/// presentation layer.
pub fn sorted_for_display(bars: &[Bar]) -> Vec<Bar> {
    newest_first(bars).into_iter().cloned().collect()
}

/// Return an oldest-first copy of `bars` with `change` and `change_percent`
/// filled in from the previous bar's close.
///
/// The earliest bar has neither field.  A zero previous close yields a
/// `change_percent` of 0.
pub fn with_price_changes(bars: &[Bar]) -> Vec<Bar> {
    let ordered = chronological(bars);
    let mut out = Vec::with_capacity(ordered.len());
    let mut prev_close: Option<f64> = None;

    for bar in ordered {
        let mut bar = bar.clone();
        match prev_close {
            Some(prev) => {
                let change = bar.close - prev;
                let pct = if prev != 0.0 { (change / prev) * 100.0 } else { 0.0 };
                bar.change = Some(round2(change));
                bar.change_percent = Some(round2(pct));
            }
            None => {
                bar.change = None;
                bar.change_percent = None;
            }
        }
        prev_close = Some(bar.close);
        out.push(bar);
    }

    out
}
