//! Error types for coder construction and stream coding.

use thiserror::Error;

/// Result type alias for coder operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Coder error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid configuration or misuse of the insertion lifecycle.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Symbol is not part of the alphabet.
    #[error("unknown symbol {symbol}")]
    UnknownSymbol { symbol: u64 },

    /// Not enough bits left in the stream.
    #[error("stream underrun: requested {requested} bits, {available} available")]
    StreamUnderrun { requested: usize, available: usize },

    /// Internal inconsistency between the tree, codes and tables.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Coding attempted before all symbols were inserted.
    #[error("coder not finalized: {inserted} of {capacity} symbols inserted")]
    NotFinalized { inserted: usize, capacity: usize },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Error::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a stream underrun error.
    pub fn underrun(requested: usize, available: usize) -> Self {
        Error::StreamUnderrun {
            requested,
            available,
        }
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "configuration",
            Error::UnknownSymbol { .. } => "unknown_symbol",
            Error::StreamUnderrun { .. } => "stream_underrun",
            Error::InvariantViolation { .. } => "invariant_violation",
            Error::NotFinalized { .. } => "not_finalized",
        }
    }
}
