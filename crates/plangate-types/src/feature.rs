//! Feature keys.

use crate::error::{validate_namespaced, KeyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A gated unit of product functionality, identified by a namespaced
/// string key such as `fees.online`.
///
/// Membership is plain set containment — there is no key hierarchy, and
/// `fees.online` is unrelated to `fees.manual`. Keys are validated at
/// construction (`namespace.name`, lowercase ascii/digits/underscores)
/// so a typo'd literal fails at the boundary instead of silently gating
/// everything off.
///
/// # Example
///
/// ```
/// use plangate_types::FeatureKey;
///
/// let key = FeatureKey::new("fees.online").unwrap();
/// assert_eq!(key.as_str(), "fees.online");
/// assert_eq!(key.namespace(), "fees");
///
/// assert!(FeatureKey::new("Fees.Online").is_err());
/// assert!(FeatureKey::new("fees").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FeatureKey(String);

impl FeatureKey {
    /// Creates a validated feature key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the key is empty, contains characters
    /// outside `[a-z0-9_.]`, or is not namespaced.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        validate_namespaced(&key)?;
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespace segment (everything before the first `.`).
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FeatureKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for FeatureKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
