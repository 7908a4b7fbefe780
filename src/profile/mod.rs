// =============================================================================
// Intraday Profile Module
// =============================================================================
//
// Session-scoped analysis of intraday bars:
// - Market profile (volume at price, POC, value area, poor highs/lows,
//   single prints, profile-type classification)
// - Single-bar candlestick classification

pub mod candlestick;
pub mod market_profile;

pub use candlestick::{
    analyze_candlestick_patterns, candlestick_summary, classify_bar, CandlestickPattern,
    CandlestickSummary, CandlestickType,
};
pub use market_profile::{
    calculate_market_profile, calculate_market_profile_with, MarketProfileAnalysis, PriceLevel,
    ProfileParams, ProfileType, SessionStats, ValueArea, VolumeNode,
};
