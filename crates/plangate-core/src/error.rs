//! Core error taxonomy.
//!
//! Four failure classes cover everything that can go wrong before a
//! check runs; `check()` itself is total and never errors:
//!
//! | Error | Raised when | Handling |
//! |-------|-------------|----------|
//! | [`CatalogError`] | A catalog table fails to load or violates an invariant | Fix the data |
//! | [`ConfigurationGap`] | A feature is owned by no plan and no add-on entry | Use the documented fallback, flag as data debt |
//! | [`MalformedGrant`] | A grant window is inverted | Reject the grant wholesale at ingestion |
//! | [`ProfileError`] | The profile carries an unknown plan/role value | Reject at the API boundary |

use chrono::{DateTime, Utc};
use plangate_types::{ErrorCode, FeatureKey, Plan};
use thiserror::Error;
use uuid::Uuid;

/// Error loading or validating a catalog table.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML table failed to parse.
    #[error("failed to parse catalog table: {0}")]
    Parse(#[from] toml::de::Error),

    /// A role was mapped to an empty capability set.
    ///
    /// Every role must map to a non-empty set; an empty set would make
    /// every capability check for that role silently false.
    #[error("role '{role}' maps to an empty capability set")]
    EmptyRoleCapabilities {
        /// The offending role name.
        role: String,
    },

    /// The owner role's set is not exactly the wildcard.
    #[error("owner must map to exactly {{\"*\"}}, got {got:?}")]
    OwnerNotWildcard {
        /// The capability keys actually mapped to owner.
        got: Vec<String>,
    },

    /// A role other than owner carries the wildcard.
    #[error("role '{role}' must not carry the wildcard capability")]
    NonOwnerWildcard {
        /// The offending role name.
        role: String,
    },

    /// The tier table is missing a tier.
    #[error("tier table is missing plan '{plan}'")]
    MissingTier {
        /// The absent tier.
        plan: Plan,
    },
}

impl ErrorCode for CatalogError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "GATE_CATALOG_IO",
            Self::Parse(_) => "GATE_CATALOG_PARSE",
            Self::EmptyRoleCapabilities { .. } => "GATE_CATALOG_EMPTY_ROLE",
            Self::OwnerNotWildcard { .. } => "GATE_CATALOG_OWNER_NOT_WILDCARD",
            Self::NonOwnerWildcard { .. } => "GATE_CATALOG_NON_OWNER_WILDCARD",
            Self::MissingTier { .. } => "GATE_CATALOG_MISSING_TIER",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// A requested feature is owned by no plan tier and no add-on entry.
///
/// The carried `fallback` is the catalog's configured default minimum
/// plan; callers may use it to render an upgrade path, but it is a
/// guess, not an authoritative answer — treat every occurrence as data
/// debt to be fixed in the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature '{feature}' is owned by no plan and no add-on entry (fallback: {fallback})")]
pub struct ConfigurationGap {
    /// The unowned feature.
    pub feature: FeatureKey,
    /// The documented default minimum plan to fall back to.
    pub fallback: Plan,
}

impl ErrorCode for ConfigurationGap {
    fn code(&self) -> &'static str {
        "GATE_CONFIGURATION_GAP"
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// A feature grant with an inverted validity window.
///
/// Malformed grants are excluded wholesale at ingestion — never
/// partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grant {id} for '{feature}' starts at {starts_at} after it expires at {expires_at}")]
pub struct MalformedGrant {
    /// The grant's identifier.
    pub id: Uuid,
    /// The granted feature.
    pub feature: FeatureKey,
    /// Window start.
    pub starts_at: DateTime<Utc>,
    /// Window end, which precedes the start.
    pub expires_at: DateTime<Utc>,
}

impl ErrorCode for MalformedGrant {
    fn code(&self) -> &'static str {
        "GATE_GRANT_MALFORMED"
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// The profile service supplied a value outside the closed plan/role
/// vocabulary.
///
/// Rejected at the API boundary; an unknown axis value never reaches
/// the checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Unknown plan name.
    #[error(transparent)]
    UnknownPlan(#[from] plangate_types::UnknownPlan),

    /// Unknown role name.
    #[error(transparent)]
    UnknownRole(#[from] plangate_types::UnknownRole),
}

impl ErrorCode for ProfileError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownPlan(_) => "GATE_PROFILE_UNKNOWN_PLAN",
            Self::UnknownRole(_) => "GATE_PROFILE_UNKNOWN_ROLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plangate_types::assert_error_code;

    #[test]
    fn catalog_error_codes() {
        assert_error_code(
            &CatalogError::EmptyRoleCapabilities {
                role: "teacher".into(),
            },
            "GATE_CATALOG_",
        );
        assert_error_code(
            &CatalogError::MissingTier { plan: Plan::Growth },
            "GATE_CATALOG_",
        );
        assert_error_code(
            &CatalogError::NonOwnerWildcard {
                role: "admin".into(),
            },
            "GATE_CATALOG_",
        );
        assert_error_code(
            &CatalogError::Io(std::io::Error::other("disk gone")),
            "GATE_CATALOG_",
        );
    }

    #[test]
    fn non_owner_wildcard_names_the_role() {
        let err = CatalogError::NonOwnerWildcard {
            role: "admin".into(),
        };
        assert!(err.to_string().contains("admin"));
        assert!(!err.to_string().contains("owner must map"));
    }

    #[test]
    fn configuration_gap_carries_fallback() {
        let gap = ConfigurationGap {
            feature: FeatureKey::new("video.calls").unwrap(),
            fallback: Plan::Growth,
        };
        assert_error_code(&gap, "GATE_");
        assert!(gap.to_string().contains("video.calls"));
        assert!(gap.to_string().contains("growth"));
    }

    #[test]
    fn malformed_grant_display() {
        let err = MalformedGrant {
            id: Uuid::nil(),
            feature: FeatureKey::new("fees.online").unwrap(),
            starts_at: Utc::now(),
            expires_at: Utc::now() - chrono::Duration::days(1),
        };
        assert_error_code(&err, "GATE_GRANT_");
        assert!(err.to_string().contains("fees.online"));
    }

    #[test]
    fn profile_errors_not_recoverable() {
        let err = ProfileError::UnknownPlan(plangate_types::UnknownPlan("gold".into()));
        assert_error_code(&err, "GATE_PROFILE_");
        assert!(!err.is_recoverable());
    }
}
