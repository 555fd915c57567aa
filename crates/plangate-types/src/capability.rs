//! Capability keys.

use crate::error::{validate_namespaced, KeyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The all-capabilities wildcard.
pub const WILDCARD: &str = "*";

/// A fine-grained permission key evaluated against a role's permitted
/// set, such as `admissions.view`.
///
/// The single key `"*"` denotes all capabilities: a set containing the
/// wildcard grants every capability check. Only the owner role's set is
/// the wildcard (and exactly `{"*"}`), but the semantics live here so
/// any set can be evaluated uniformly.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use plangate_types::CapabilityKey;
///
/// let view = CapabilityKey::new("admissions.view").unwrap();
/// let set: BTreeSet<_> = [CapabilityKey::wildcard()].into();
/// assert!(view.granted_by(&set));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CapabilityKey(String);

impl CapabilityKey {
    /// Creates a validated capability key.
    ///
    /// Accepts the wildcard `"*"` or a namespaced key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] for anything else.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key == WILDCARD {
            return Ok(Self(key));
        }
        validate_namespaced(&key)?;
        Ok(Self(key))
    }

    /// Returns the all-capabilities wildcard key.
    #[must_use]
    pub fn wildcard() -> Self {
        Self(WILDCARD.to_string())
    }

    /// Returns `true` if this key is the wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `set` grants this capability.
    ///
    /// A set grants a capability if it contains the capability itself or
    /// the wildcard.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use plangate_types::CapabilityKey;
    ///
    /// let view = CapabilityKey::new("fees.view").unwrap();
    /// let manage = CapabilityKey::new("fees.manage").unwrap();
    ///
    /// let set: BTreeSet<_> = [view.clone()].into();
    /// assert!(view.granted_by(&set));
    /// assert!(!manage.granted_by(&set));
    /// ```
    #[must_use]
    pub fn granted_by(&self, set: &BTreeSet<CapabilityKey>) -> bool {
        set.contains(self) || set.iter().any(CapabilityKey::is_wildcard)
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CapabilityKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for CapabilityKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
