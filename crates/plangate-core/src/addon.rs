//! Purchasable add-on registry.
//!
//! Add-ons are features purchasable independently of the plan tier,
//! delivered to a session as time-bounded grants. The registry maps an
//! external purchase identifier (the billing system's SKU) to the
//! feature it unlocks plus display metadata and the minimum plan the
//! add-on can be attached to.
//!
//! # Fallback Tier
//!
//! `min_plan_for_addon` must answer even for features no registry entry
//! owns. The answer then comes from the catalog's configured
//! `fallback_min_plan` — a guess recorded as data, not logic. Every
//! fallback hit is logged as a data-quality gap; it must never be
//! treated as authoritative.

use crate::error::ConfigurationGap;
use crate::plan_catalog::PlanCatalog;
use plangate_types::{FeatureKey, Plan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry entry for a purchasable add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonConfig {
    /// The feature this add-on unlocks.
    pub feature: FeatureKey,
    /// Display label.
    pub label: String,
    /// Monthly price in the smallest currency unit.
    pub price_cents: u32,
    /// Display description.
    pub description: String,
    /// Display category (e.g. "payments", "communication").
    pub category: String,
    /// Lowest plan tier the add-on can be purchased on.
    pub min_plan: Plan,
}

/// Registry of purchasable add-on features, keyed by external purchase
/// identifier.
///
/// # Example
///
/// ```
/// use plangate_core::AddonCatalog;
/// use plangate_types::{FeatureKey, Plan};
///
/// let catalog = AddonCatalog::default();
/// let sms = FeatureKey::new("messaging.sms").unwrap();
///
/// let config = catalog.by_feature(&sms).unwrap();
/// assert_eq!(config.min_plan, Plan::Starter);
/// assert_eq!(catalog.min_plan_for_addon(&sms), Plan::Starter);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonCatalog {
    /// Table version, bumped on every data change.
    version: u32,
    /// Default minimum plan for features with no registry entry.
    ///
    /// Configuration, not logic: the tier is a documented guess and a
    /// hit on it signals missing registry data.
    fallback_min_plan: Plan,
    /// Registry entries keyed by purchase identifier.
    addons: BTreeMap<String, AddonConfig>,
}

impl AddonCatalog {
    /// Loads an add-on registry from a TOML document.
    ///
    /// ```toml
    /// version = 3
    /// fallback_min_plan = "growth"
    ///
    /// [addons.addon_fees_online]
    /// feature = "fees.online"
    /// label = "Online fee collection"
    /// price_cents = 4900
    /// description = "Collect fees by card and bank transfer"
    /// category = "payments"
    /// min_plan = "starter"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a parse error on malformed TOML or invalid keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, crate::error::CatalogError> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads an add-on registry from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`](crate::error::CatalogError::Io) if
    /// the file cannot be read, plus everything
    /// [`AddonCatalog::from_toml_str`] rejects.
    pub fn from_toml_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::error::CatalogError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Returns the table version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the configured default minimum plan for unregistered
    /// add-on features.
    #[must_use]
    pub fn fallback_min_plan(&self) -> Plan {
        self.fallback_min_plan
    }

    /// Looks up a registry entry by purchase identifier.
    #[must_use]
    pub fn get(&self, purchase_id: &str) -> Option<&AddonConfig> {
        self.addons.get(purchase_id)
    }

    /// Looks up the registry entry that unlocks `feature`.
    #[must_use]
    pub fn by_feature(&self, feature: &FeatureKey) -> Option<&AddonConfig> {
        self.addons.values().find(|a| &a.feature == feature)
    }

    /// Returns the minimum plan for an add-on feature.
    ///
    /// Unregistered features resolve to the configured fallback tier;
    /// the hit is logged as a data-quality gap and must not be treated
    /// as authoritative.
    #[must_use]
    pub fn min_plan_for_addon(&self, feature: &FeatureKey) -> Plan {
        match self.by_feature(feature) {
            Some(config) => config.min_plan,
            None => {
                tracing::warn!(
                    feature = %feature,
                    fallback = %self.fallback_min_plan,
                    "add-on registry has no entry for feature; using fallback tier (data-quality gap)"
                );
                self.fallback_min_plan
            }
        }
    }
}

impl Default for AddonCatalog {
    /// The compiled-in add-on registry.
    fn default() -> Self {
        fn entry(
            feature: &str,
            label: &str,
            price_cents: u32,
            description: &str,
            category: &str,
            min_plan: Plan,
        ) -> AddonConfig {
            AddonConfig {
                feature: FeatureKey::new(feature).expect("builtin feature key"),
                label: label.to_string(),
                price_cents,
                description: description.to_string(),
                category: category.to_string(),
                min_plan,
            }
        }

        let mut addons = BTreeMap::new();
        addons.insert(
            "addon_fees_online".to_string(),
            entry(
                "fees.online",
                "Online fee collection",
                4900,
                "Collect fees by card and bank transfer",
                "payments",
                Plan::Starter,
            ),
        );
        addons.insert(
            "addon_messaging_sms".to_string(),
            entry(
                "messaging.sms",
                "SMS messaging pack",
                1900,
                "Send SMS notifications to guardians",
                "communication",
                Plan::Starter,
            ),
        );
        addons.insert(
            "addon_api_access".to_string(),
            entry(
                "api.access",
                "API access",
                9900,
                "REST API access for custom integrations",
                "platform",
                Plan::Growth,
            ),
        );
        addons.insert(
            "addon_reports_custom".to_string(),
            entry(
                "reports.custom",
                "Custom report builder",
                5900,
                "Build and schedule custom reports",
                "analytics",
                Plan::Growth,
            ),
        );

        Self {
            version: 1,
            fallback_min_plan: Plan::Growth,
            addons,
        }
    }
}

/// Resolves the minimum plan that unlocks `feature`, consulting the
/// tier table first and the add-on registry second.
///
/// # Errors
///
/// Returns [`ConfigurationGap`] when neither catalog owns the feature.
/// The error carries the registry's fallback tier so callers can still
/// render an upgrade path while the gap is flagged as data debt.
pub fn required_plan_for(
    plans: &PlanCatalog,
    addons: &AddonCatalog,
    feature: &FeatureKey,
) -> Result<Plan, ConfigurationGap> {
    if let Some(plan) = plans.min_plan_for(feature) {
        return Ok(plan);
    }
    if let Some(config) = addons.by_feature(feature) {
        return Ok(config.min_plan);
    }
    Err(ConfigurationGap {
        feature: feature.clone(),
        fallback: addons.fallback_min_plan(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(s: &str) -> FeatureKey {
        FeatureKey::new(s).expect("valid feature")
    }

    #[test]
    fn lookup_by_purchase_id() {
        let catalog = AddonCatalog::default();
        let config = catalog.get("addon_fees_online").expect("registered");
        assert_eq!(config.feature, feature("fees.online"));
        assert_eq!(config.min_plan, Plan::Starter);
        assert!(catalog.get("addon_unknown").is_none());
    }

    #[test]
    fn lookup_by_feature() {
        let catalog = AddonCatalog::default();
        let config = catalog.by_feature(&feature("api.access")).expect("registered");
        assert_eq!(config.category, "platform");
        assert!(catalog.by_feature(&feature("video.calls")).is_none());
    }

    #[test]
    fn min_plan_uses_registry_entry() {
        let catalog = AddonCatalog::default();
        assert_eq!(
            catalog.min_plan_for_addon(&feature("messaging.sms")),
            Plan::Starter
        );
    }

    #[test]
    fn min_plan_falls_back_for_unregistered() {
        let catalog = AddonCatalog::default();
        assert_eq!(
            catalog.min_plan_for_addon(&feature("video.calls")),
            catalog.fallback_min_plan()
        );
    }

    #[test]
    fn required_plan_prefers_tier_table() {
        let plans = PlanCatalog::default();
        let addons = AddonCatalog::default();
        // fees.online sits in growth's base list; its add-on entry says
        // starter, but the tier table answers first.
        assert_eq!(
            required_plan_for(&plans, &addons, &feature("fees.online")),
            Ok(Plan::Growth)
        );
    }

    #[test]
    fn required_plan_reports_gap_with_fallback() {
        let plans = PlanCatalog::default();
        let addons = AddonCatalog::default();
        let gap = required_plan_for(&plans, &addons, &feature("video.calls")).unwrap_err();
        assert_eq!(gap.feature, feature("video.calls"));
        assert_eq!(gap.fallback, addons.fallback_min_plan());
    }

    #[test]
    fn loads_from_toml() {
        let raw = r#"
            version = 3
            fallback_min_plan = "scale"

            [addons.addon_video]
            feature = "video.calls"
            label = "Video calls"
            price_cents = 2900
            description = "Built-in video calling"
            category = "communication"
            min_plan = "growth"
        "#;
        let catalog = AddonCatalog::from_toml_str(raw).expect("valid table");
        assert_eq!(catalog.version(), 3);
        assert_eq!(catalog.fallback_min_plan(), Plan::Scale);
        assert_eq!(
            catalog.min_plan_for_addon(&feature("video.calls")),
            Plan::Growth
        );
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("addons.toml");
        std::fs::write(
            &path,
            r#"
                version = 2
                fallback_min_plan = "growth"

                [addons.addon_video]
                feature = "video.calls"
                label = "Video calls"
                price_cents = 2900
                description = "Built-in video calling"
                category = "communication"
                min_plan = "growth"
            "#,
        )
        .expect("write table");

        let catalog = AddonCatalog::from_toml_file(&path).expect("valid table");
        assert_eq!(catalog.version(), 2);
        assert!(catalog.by_feature(&feature("video.calls")).is_some());
    }

    #[test]
    fn toml_with_unknown_plan_rejected() {
        let raw = r#"
            version = 1
            fallback_min_plan = "platinum"
            addons = {}
        "#;
        assert!(AddonCatalog::from_toml_str(raw).is_err());
    }
}
