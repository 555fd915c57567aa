//! Runtime error taxonomy.
//!
//! Everything here is a fetch-side failure. None of them surface to the
//! checker: the store catches them and fails closed to the minimal
//! state, so a fetch problem can deny access but never widen it.

use plangate_core::ProfileError;
use plangate_types::ErrorCode;
use std::time::Duration;
use thiserror::Error;

/// Failure fetching or validating the account profile.
#[derive(Debug, Error)]
pub enum ProfileFetchFailure {
    /// The fetch exceeded the configured timeout.
    #[error("profile fetch timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The profile service reported a failure.
    #[error("profile service unavailable: {message}")]
    Unavailable {
        /// Service-supplied failure description.
        message: String,
    },

    /// The service answered with an invalid profile.
    #[error(transparent)]
    Invalid(#[from] ProfileError),
}

impl ProfileFetchFailure {
    /// Shorthand for a service failure.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl ErrorCode for ProfileFetchFailure {
    fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "GATE_FETCH_TIMEOUT",
            Self::Unavailable { .. } => "GATE_FETCH_UNAVAILABLE",
            Self::Invalid(_) => "GATE_FETCH_INVALID_PROFILE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Timeouts and outages may succeed on a later refresh; an
        // invalid profile will not until the data is fixed.
        !matches!(self, Self::Invalid(_))
    }
}
