//! Error types for the ledger engine.

use thiserror::Error;

/// Top-level error type for engine construction and maintenance operations.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal invariant violation: {0}")]
    Invariant(String),

    #[error("metrics error: {0}")]
    Metrics(String),
}

/// Result type alias for fallible ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<prometheus::Error> for LedgerError {
    fn from(err: prometheus::Error) -> Self {
        LedgerError::Metrics(err.to_string())
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Outcome of an admission-controlled submission.
///
/// Not a [`LedgerError`]: overload is an expected, countable outcome of
/// normal operation. The executor's own outcomes (processed/failed) are
/// counted, never returned as `Result::Err` — see `executor` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Admission passed; `count` transactions were enqueued asynchronously.
    Accepted,
    /// Admission failed: accepting would have breached `max_queue_size`.
    Overload,
}
