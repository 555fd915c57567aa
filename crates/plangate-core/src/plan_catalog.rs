//! Plan tier catalog.
//!
//! The tier table is versioned data, not logic: each tier owns a base
//! feature list, and a plan's resolved set is the cumulative union of
//! every tier at or below it. Updating the table never touches the
//! resolution algorithm.
//!
//! # Cumulative Resolution
//!
//! ```text
//! free       : {students.directory, fees.manual, reports.basic}
//! starter    : free    ∪ {admissions.pipeline, fees.invoicing, messaging.email}
//! growth     : starter ∪ {fees.online, reports.advanced, messaging.sms}
//! scale      : growth  ∪ {api.access, integrations.accounting, reports.custom}
//! enterprise : scale   ∪ {sso.saml, audit.log, support.dedicated}
//! ```
//!
//! Adding a new top tier never alters an earlier tier's resolved set.

use crate::error::CatalogError;
use plangate_types::{FeatureKey, Plan};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered tier definitions with per-tier base feature lists.
///
/// # Invariants
///
/// - Every tier in [`Plan::ALL`] is present in the table
/// - `cumulative_features` is monotone in rank: for plans `p1 <= p2`,
///   `cumulative_features(p1) ⊆ cumulative_features(p2)`
///
/// # Example
///
/// ```
/// use plangate_core::PlanCatalog;
/// use plangate_types::{FeatureKey, Plan};
///
/// let catalog = PlanCatalog::default();
/// let online_fees = FeatureKey::new("fees.online").unwrap();
///
/// assert!(catalog.cumulative_features(Plan::Growth).contains(&online_fees));
/// assert!(!catalog.cumulative_features(Plan::Starter).contains(&online_fees));
/// assert_eq!(catalog.min_plan_for(&online_fees), Some(Plan::Growth));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCatalog {
    /// Table version, bumped on every data change.
    version: u32,
    /// Base (non-cumulative) feature list per tier.
    tiers: BTreeMap<Plan, BTreeSet<FeatureKey>>,
}

impl PlanCatalog {
    /// Loads a tier table from a TOML document.
    ///
    /// ```toml
    /// version = 4
    ///
    /// [tiers]
    /// free = ["students.directory"]
    /// starter = ["admissions.pipeline"]
    /// growth = ["fees.online"]
    /// scale = ["api.access"]
    /// enterprise = ["sso.saml"]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] on malformed TOML or invalid
    /// feature keys, and [`CatalogError::MissingTier`] if any tier is
    /// absent from the table.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a tier table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus
    /// everything [`PlanCatalog::from_toml_str`] rejects.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Returns the table version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the cumulative feature set for a plan: the union of the
    /// base lists of every tier ranked at or below it.
    #[must_use]
    pub fn cumulative_features(&self, plan: Plan) -> BTreeSet<FeatureKey> {
        self.tiers
            .range(..=plan)
            .flat_map(|(_, base)| base.iter().cloned())
            .collect()
    }

    /// Returns the lowest-rank plan whose base list contains `feature`,
    /// or `None` for features owned by no tier (add-on-only features).
    #[must_use]
    pub fn min_plan_for(&self, feature: &FeatureKey) -> Option<Plan> {
        self.tiers
            .iter()
            .find(|(_, base)| base.contains(feature))
            .map(|(plan, _)| *plan)
    }

    /// Returns `true` if any tier's base list contains `feature`.
    #[must_use]
    pub fn owns_feature(&self, feature: &FeatureKey) -> bool {
        self.min_plan_for(feature).is_some()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for plan in Plan::ALL {
            if !self.tiers.contains_key(&plan) {
                return Err(CatalogError::MissingTier { plan });
            }
        }
        Ok(())
    }
}

impl Default for PlanCatalog {
    /// The compiled-in tier table.
    fn default() -> Self {
        fn features(keys: &[&str]) -> BTreeSet<FeatureKey> {
            keys.iter()
                .map(|k| FeatureKey::new(*k).expect("builtin feature key"))
                .collect()
        }

        let mut tiers = BTreeMap::new();
        tiers.insert(
            Plan::Free,
            features(&["students.directory", "fees.manual", "reports.basic"]),
        );
        tiers.insert(
            Plan::Starter,
            features(&["admissions.pipeline", "fees.invoicing", "messaging.email"]),
        );
        tiers.insert(
            Plan::Growth,
            features(&["fees.online", "reports.advanced", "messaging.sms"]),
        );
        tiers.insert(
            Plan::Scale,
            features(&["api.access", "integrations.accounting", "reports.custom"]),
        );
        tiers.insert(
            Plan::Enterprise,
            features(&["sso.saml", "audit.log", "support.dedicated"]),
        );

        Self { version: 1, tiers }
    }
}
