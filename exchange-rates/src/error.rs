//! Error types for rate fetching and money handling.

use std::time::Duration;

/// Failure to obtain a usable rate snapshot from the provider.
///
/// `Clone` because a single refresh outcome is handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateFetchError {
    #[error("Rate provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate provider unreachable: {0}")]
    Unreachable(String),

    #[error("Rate provider returned HTTP {0}")]
    Status(u16),

    #[error("Rate provider rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed rate payload: {0}")]
    Malformed(String),

    #[error("Rate refresh aborted: {0}")]
    Aborted(String),
}

/// Invalid monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative")]
    Negative,

    #[error("Invalid amount: {0}")]
    Invalid(String),
}
