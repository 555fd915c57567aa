//! Startup key audits.
//!
//! Feature and capability keys are open vocabularies, so a typo in a
//! call site compiles fine and silently denies forever. These audits
//! cross-check the keys an application actually gates on against the
//! catalogs at startup and log every orphan, turning silent denials
//! into a visible report.

use crate::addon::AddonCatalog;
use crate::capability_map::CapabilityMap;
use crate::plan_catalog::PlanCatalog;
use plangate_types::{CapabilityKey, FeatureKey};

/// The outcome of a startup key audit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditReport {
    /// Feature keys neither the tier table nor the add-on registry owns.
    pub unknown_features: Vec<FeatureKey>,
    /// Capability keys no role's set grants outright.
    pub unknown_capabilities: Vec<CapabilityKey>,
}

impl AuditReport {
    /// Returns `true` if every audited key resolved.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown_features.is_empty() && self.unknown_capabilities.is_empty()
    }
}

/// Returns the feature keys that no catalog owns.
///
/// A feature key outside both the tier table and the add-on registry
/// can only ever be unlocked by a grant; gating a route on one is
/// usually a typo. Each orphan is logged at `warn`.
#[must_use]
pub fn verify_feature_keys<'a, I>(
    keys: I,
    plans: &PlanCatalog,
    addons: &AddonCatalog,
) -> Vec<FeatureKey>
where
    I: IntoIterator<Item = &'a FeatureKey>,
{
    let mut unknown = Vec::new();
    for key in keys {
        if plans.min_plan_for(key).is_none() && addons.by_feature(key).is_none() {
            tracing::warn!(feature = %key, "gated feature key not found in any catalog");
            unknown.push(key.clone());
        }
    }
    unknown
}

/// Returns the capability keys no role's set grants outright.
///
/// Wildcard sets are ignored: a key only the owner can ever pass is
/// still an always-false check for every other role. Each orphan is
/// logged at `warn`.
#[must_use]
pub fn verify_capability_keys<'a, I>(keys: I, map: &CapabilityMap) -> Vec<CapabilityKey>
where
    I: IntoIterator<Item = &'a CapabilityKey>,
{
    let mut unknown = Vec::new();
    for key in keys {
        if !key.is_wildcard() && !map.any_role_grants(key) {
            tracing::warn!(capability = %key, "gated capability key not granted by any role");
            unknown.push(key.clone());
        }
    }
    unknown
}

/// Runs both audits and collects the orphans into one report.
///
/// # Example
///
/// ```
/// use plangate_core::audit::audit_keys;
/// use plangate_core::{AddonCatalog, CapabilityMap, PlanCatalog};
/// use plangate_types::{CapabilityKey, FeatureKey};
///
/// let features = vec![FeatureKey::new("fees.online").unwrap()];
/// let capabilities = vec![CapabilityKey::new("fees.manage").unwrap()];
///
/// let report = audit_keys(
///     &features,
///     &capabilities,
///     &PlanCatalog::default(),
///     &AddonCatalog::default(),
///     &CapabilityMap::default(),
/// );
/// assert!(report.is_clean());
/// ```
#[must_use]
pub fn audit_keys(
    features: &[FeatureKey],
    capabilities: &[CapabilityKey],
    plans: &PlanCatalog,
    addons: &AddonCatalog,
    map: &CapabilityMap,
) -> AuditReport {
    AuditReport {
        unknown_features: verify_feature_keys(features, plans, addons),
        unknown_capabilities: verify_capability_keys(capabilities, map),
    }
}
