// =============================================================================
// Engine error type
// =============================================================================
//
// Insufficient history is *not* an error anywhere in the engine: indicator
// functions return `None`.  Only the conditions below abort a computation.

use thiserror::Error;

/// The unified error type for the analysis engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A market profile was requested for a session with zero bars.
    #[error("no data available for market profile analysis")]
    EmptySession,

    /// A configuration value is outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
