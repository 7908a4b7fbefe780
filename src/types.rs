// =============================================================================
// Shared types used across the analysis engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Moving-average flavour selectable in the dashboard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovingAverageType {
    Sma,
    Ema,
    Wma,
}

impl MovingAverageType {
    /// Lower-case prefix used to build indicator keys (`sma20`, `ema21`, ...).
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Wma => "wma",
        }
    }

    /// Build the indicator key for this flavour and `period`.
    pub fn key(self, period: usize) -> String {
        format!("{}{}", self.key_prefix(), period)
    }
}

impl std::fmt::Display for MovingAverageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma => write!(f, "SMA"),
            Self::Ema => write!(f, "EMA"),
            Self::Wma => write!(f, "WMA"),
        }
    }
}

impl std::str::FromStr for MovingAverageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SMA" => Ok(Self::Sma),
            "EMA" => Ok(Self::Ema),
            "WMA" => Ok(Self::Wma),
            other => Err(format!("unknown moving average type: {other}")),
        }
    }
}
