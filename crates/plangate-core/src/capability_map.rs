//! Role → capability-set mapping.
//!
//! Like the tier table, the role map is versioned data with a
//! compiled-in default. Each role maps to exactly one capability set —
//! no multi-role accounts, no inheritance between roles.
//!
//! # Wildcard
//!
//! The owner role maps to exactly `{"*"}`; the wildcard grants every
//! capability check. No other role may carry the wildcard, which the
//! loader enforces.

use crate::error::CatalogError;
use plangate_types::{CapabilityKey, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Static role → capability-set mapping.
///
/// # Invariants
///
/// - Every role maps to a non-empty set
/// - Owner maps to exactly `{"*"}`; no other role contains the wildcard
///
/// # Example
///
/// ```
/// use plangate_core::CapabilityMap;
/// use plangate_types::{CapabilityKey, Role};
///
/// let map = CapabilityMap::default();
/// let admissions = CapabilityKey::new("admissions.view").unwrap();
///
/// assert!(admissions.granted_by(map.capabilities_for(Role::Admin)));
/// assert!(!admissions.granted_by(map.capabilities_for(Role::Teacher)));
/// // Owner's wildcard grants everything
/// assert!(admissions.granted_by(map.capabilities_for(Role::Owner)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMap {
    /// Table version, bumped on every data change.
    version: u32,
    /// Capability set per role.
    roles: BTreeMap<String, BTreeSet<CapabilityKey>>,
}

impl CapabilityMap {
    /// Loads a role map from a TOML document.
    ///
    /// ```toml
    /// version = 2
    ///
    /// [roles]
    /// owner = ["*"]
    /// admin = ["admissions.view", "fees.manage"]
    /// accountant = ["fees.view"]
    /// teacher = ["students.view"]
    /// staff = ["students.view"]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed TOML, a role with an empty
    /// set, a non-owner role carrying the wildcard, or an owner set that
    /// is not exactly `{"*"}`.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let map: Self = toml::from_str(raw)?;
        map.validate()?;
        Ok(map)
    }

    /// Loads a role map from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus
    /// everything [`CapabilityMap::from_toml_str`] rejects.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Returns the table version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the capability set for a role.
    ///
    /// Non-empty for every role in a validated map; owner's set is
    /// exactly the wildcard. A map that somehow misses a role resolves
    /// to no capabilities — fail closed, never open.
    #[must_use]
    pub fn capabilities_for(&self, role: Role) -> &BTreeSet<CapabilityKey> {
        static EMPTY: std::sync::LazyLock<BTreeSet<CapabilityKey>> =
            std::sync::LazyLock::new(BTreeSet::new);

        match self.roles.get(role.as_str()) {
            Some(set) => set,
            None => {
                tracing::error!(role = %role, "capability map missing role; resolving to no capabilities");
                &EMPTY
            }
        }
    }

    /// Returns `true` if any role's set grants `cap` outright (wildcard
    /// excluded).
    ///
    /// Used by startup audits: a capability literal no role grants is an
    /// always-false check for everyone but the owner.
    #[must_use]
    pub fn any_role_grants(&self, cap: &CapabilityKey) -> bool {
        self.roles.values().any(|set| set.contains(cap))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for role in Role::ALL {
            let Some(set) = self.roles.get(role.as_str()) else {
                return Err(CatalogError::EmptyRoleCapabilities {
                    role: role.to_string(),
                });
            };
            if set.is_empty() {
                return Err(CatalogError::EmptyRoleCapabilities {
                    role: role.to_string(),
                });
            }
            let has_wildcard = set.iter().any(CapabilityKey::is_wildcard);
            if role.is_owner() {
                if !has_wildcard || set.len() != 1 {
                    return Err(CatalogError::OwnerNotWildcard {
                        got: set.iter().map(|c| c.as_str().to_string()).collect(),
                    });
                }
            } else if has_wildcard {
                return Err(CatalogError::NonOwnerWildcard {
                    role: role.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for CapabilityMap {
    /// The compiled-in role map.
    fn default() -> Self {
        fn caps(keys: &[&str]) -> BTreeSet<CapabilityKey> {
            keys.iter()
                .map(|k| CapabilityKey::new(*k).expect("builtin capability key"))
                .collect()
        }

        let mut roles = BTreeMap::new();
        roles.insert("owner".to_string(), caps(&["*"]));
        roles.insert(
            "admin".to_string(),
            caps(&[
                "admissions.view",
                "admissions.manage",
                "students.view",
                "students.manage",
                "fees.view",
                "fees.manage",
                "reports.view",
                "settings.manage",
            ]),
        );
        roles.insert(
            "accountant".to_string(),
            caps(&["fees.view", "fees.manage", "reports.view"]),
        );
        roles.insert(
            "teacher".to_string(),
            caps(&[
                "students.view",
                "attendance.manage",
                "gradebook.manage",
                "reports.view",
            ]),
        );
        roles.insert("staff".to_string(), caps(&["students.view"]));

        Self { version: 1, roles }
    }
}
