// =============================================================================
// Market Profile Engine
// =============================================================================
//
// Pure technical-analysis engine over OHLCV bars:
// - Daily indicators (SMA, EMA, WMA, ATR, ADR, RSI, Volume SMA, pivots)
// - Daily gap / range / previous-day-level analytics
// - Intraday market profile and candlestick classification
// - Composition of the above into per-symbol reports
//
// Every computation is a function of its inputs; nothing is cached or shared.
// =============================================================================

pub mod aggregator;
pub mod error;
pub mod gap_analysis;
pub mod indicators;
pub mod market_data;
pub mod profile;
pub mod runtime_config;
pub mod types;

pub use aggregator::{
    analyze_daily, analyze_intraday, analyze_symbols, calculate_all_indicators,
    calculate_configured_indicators, price_change, DailyReport, IndicatorResult, IntradayReport,
    PriceChange,
};
pub use error::{EngineError, EngineResult};
pub use gap_analysis::{enhance_daily_bars, EnrichedBar, GapFill, LevelBreak};
pub use market_data::{Bar, IntradayBar};
pub use profile::{calculate_market_profile, MarketProfileAnalysis, ProfileParams, ProfileType};
pub use runtime_config::{EngineConfig, MovingAverage};
pub use types::MovingAverageType;
