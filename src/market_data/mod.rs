pub mod bar;

// Re-export the bar types for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{
    chronological, newest_first, sorted_for_display, with_price_changes, Bar, IntradayBar,
};
