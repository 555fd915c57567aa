//! Account profile contract.
//!
//! The profile service supplies the raw plan, role, and grant records a
//! session resolves from. Only the contract is defined here — transport
//! belongs to the caller.
//!
//! # Boundary Validation
//!
//! [`RawProfile`] carries plan/role as plain strings, exactly as a
//! transport layer would deliver them. [`RawProfile::parse`] rejects
//! unknown enum values at this boundary, so the checker never sees an
//! invalid axis.

use crate::error::ProfileError;
use crate::grant::FeatureGrant;
use plangate_types::{Plan, Role};
use serde::{Deserialize, Serialize};

/// A validated account profile: the inputs to access-state resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Subscription plan tier.
    pub plan: Plan,
    /// The principal's role.
    pub role: Role,
    /// Time-bounded feature grants, possibly including expired or
    /// not-yet-started ones — resolution filters by `now`.
    #[serde(default)]
    pub grants: Vec<FeatureGrant>,
}

impl AccountProfile {
    /// Creates a profile with no grants.
    #[must_use]
    pub fn new(plan: Plan, role: Role) -> Self {
        Self {
            plan,
            role,
            grants: Vec::new(),
        }
    }

    /// Attaches grants.
    #[must_use]
    pub fn with_grants(mut self, grants: Vec<FeatureGrant>) -> Self {
        self.grants = grants;
        self
    }
}

/// An unvalidated profile as delivered by the transport layer.
///
/// # Example
///
/// ```
/// use plangate_core::RawProfile;
/// use plangate_types::{Plan, Role};
///
/// let raw = RawProfile {
///     plan: "growth".into(),
///     role: "teacher".into(),
///     grants: vec![],
/// };
/// let profile = raw.parse().unwrap();
/// assert_eq!(profile.plan, Plan::Growth);
/// assert_eq!(profile.role, Role::Teacher);
///
/// let bad = RawProfile { plan: "gold".into(), role: "teacher".into(), grants: vec![] };
/// assert!(bad.parse().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    /// Plan name (lowercase wire format).
    pub plan: String,
    /// Role name (lowercase wire format).
    pub role: String,
    /// Grant records.
    #[serde(default)]
    pub grants: Vec<FeatureGrant>,
}

impl RawProfile {
    /// Validates the raw values into an [`AccountProfile`].
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] for a plan or role outside the closed
    /// vocabulary.
    pub fn parse(self) -> Result<AccountProfile, ProfileError> {
        let plan: Plan = self.plan.parse()?;
        let role: Role = self.role.parse()?;
        Ok(AccountProfile {
            plan,
            role,
            grants: self.grants,
        })
    }
}
