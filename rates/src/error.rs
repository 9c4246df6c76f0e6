//! Rate resolver error types.

use salarium_common::Currency;
use thiserror::Error;

/// Errors that can occur during rate resolution.
#[derive(Debug, Error)]
pub enum RateError {
    /// Every resolver tier was exhausted for the pair. Callers must treat
    /// this as non-fatal and fall back to the un-converted amount.
    #[error("No rate available for {from}/{to}")]
    Unavailable { from: Currency, to: Currency },

    /// The live fetch exceeded its bound. Recovered internally by falling
    /// through tiers; surfaces only in logs.
    #[error("Live rate fetch timed out after {ms}ms")]
    Timeout { ms: i64 },

    /// The live source returned an error.
    #[error("Rate source error: {0}")]
    Source(String),
}

/// Result type for rate operations.
pub type RateResult<T> = Result<T, RateError>;
