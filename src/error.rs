//! Unified error handling for altwatch.
//!
//! Only two things leave the alt-check core: a [`Decision`](crate::check::Decision)
//! or a [`CheckError`]. Provider failures ([`ProviderError`]) are absorbed by the
//! reputation aggregator and never reach callers.

use crate::db::DbError;
use thiserror::Error;

// ============================================================================
// Check Errors (pipeline outcome)
// ============================================================================

/// Terminal outcomes of an alt check other than a decision.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Resolution or cohort fetch yielded nothing. A normal outcome, rendered
    /// to the requester as "not found".
    #[error("player not found")]
    PlayerNotFound,

    #[error("identity store error: {0}")]
    Store(#[from] DbError),
}

impl CheckError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PlayerNotFound => "player_not_found",
            Self::Store(_) => "store_error",
        }
    }
}

/// Result type for the alt-check pipeline.
pub type CheckResult<T> = Result<T, CheckError>;

// ============================================================================
// Provider Errors (swallowed by the aggregator)
// ============================================================================

/// Failure of an external reputation provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_error_codes() {
        assert_eq!(CheckError::PlayerNotFound.error_code(), "player_not_found");
        let store = CheckError::Store(DbError::Internal("boom".into()));
        assert_eq!(store.error_code(), "store_error");
    }

    #[test]
    fn test_provider_error_codes() {
        assert_eq!(ProviderError::Timeout.error_code(), "timeout");
        assert_eq!(ProviderError::Status(503).error_code(), "status");
        assert_eq!(ProviderError::Decode("x".into()).to_string(), "malformed response: x");
    }
}
