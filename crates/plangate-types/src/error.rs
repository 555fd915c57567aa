//! Unified error interface and key validation errors.
//!
//! Every plangate error type implements [`ErrorCode`] so callers get:
//!
//! - **Machine-readable codes**: stable `GATE_*` identifiers for
//!   programmatic handling and analytics
//! - **Recoverability info**: whether a retry or user action can help
//!
//! # Example
//!
//! ```
//! use plangate_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Timeout,
//!     Unauthorized,
//! }
//!
//! impl ErrorCode for FetchError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Timeout => "GATE_FETCH_TIMEOUT",
//!             Self::Unauthorized => "GATE_FETCH_UNAUTHORIZED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//! }
//!
//! assert_eq!(FetchError::Timeout.code(), "GATE_FETCH_TIMEOUT");
//! ```

use thiserror::Error;

/// Unified error code interface for plangate errors.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, prefixed `GATE_`
/// - **Stable**: codes are an API contract and never change once shipped
///
/// # Recoverability
///
/// Recoverable: transient conditions (fetch timeout) or conditions the
/// user can fix (upgrade the plan). Non-recoverable: malformed input and
/// configuration gaps, which require a data or code change.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or user action may resolve the error.
    fn is_recoverable(&self) -> bool;
}

/// Error constructing a [`FeatureKey`](crate::FeatureKey) or
/// [`CapabilityKey`](crate::CapabilityKey).
///
/// Keys are validated at construction so that a typo'd literal fails
/// loudly instead of producing an always-false membership check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key was empty.
    #[error("key must not be empty")]
    Empty,

    /// The key contains a character outside `[a-z0-9_.]`.
    #[error("key '{key}' contains invalid characters (allowed: lowercase ascii, digits, '_', '.')")]
    InvalidCharacter {
        /// The offending key.
        key: String,
    },

    /// The key is not namespaced (`namespace.name`) or has an empty segment.
    #[error("key '{key}' must be namespaced as 'namespace.name' with non-empty segments")]
    NotNamespaced {
        /// The offending key.
        key: String,
    },
}

impl ErrorCode for KeyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "GATE_KEY_EMPTY",
            Self::InvalidCharacter { .. } => "GATE_KEY_INVALID_CHAR",
            Self::NotNamespaced { .. } => "GATE_KEY_NOT_NAMESPACED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A malformed key literal requires a code or data fix.
        false
    }
}

/// Validates a namespaced key: `segment.segment[...]`, each segment
/// non-empty over `[a-z0-9_]`.
pub(crate) fn validate_namespaced(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    {
        return Err(KeyError::InvalidCharacter {
            key: key.to_string(),
        });
    }
    let segments: Vec<&str> = key.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(KeyError::NotNamespaced {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Validates that an error code follows plangate conventions.
///
/// # Checks
///
/// 1. Code is non-empty
/// 2. Code starts with the expected prefix
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if validation fails. Intended for
/// tests covering every variant of an error enum.
///
/// # Example
///
/// ```
/// use plangate_types::{assert_error_code, KeyError};
///
/// assert_error_code(&KeyError::Empty, "GATE_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Validates multiple error codes at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
