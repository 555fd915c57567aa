//! Resolved per-session access state.
//!
//! [`AccessState`] is an immutable snapshot value: resolution builds a
//! complete new state, and the runtime swaps snapshots atomically rather
//! than mutating fields in place. Readers always see either the prior
//! complete state or the fully-updated one.

use crate::capability_map::CapabilityMap;
use crate::ledger::GrantLedger;
use crate::plan_catalog::PlanCatalog;
use crate::profile::AccountProfile;
use chrono::{DateTime, Utc};
use plangate_types::{CapabilityKey, FeatureKey, Plan, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The resolved entitlements of one session.
///
/// # Lifecycle
///
/// ```text
/// loading() ──initialize──► resolve(profile, …, now)
///     │                          │
///     │ fetch failed             │ refresh
///     ▼                          ▼
/// minimal()  (fail closed)   resolve(…)   (atomic swap)
/// ```
///
/// Created minimal/loading at session start, populated once by the
/// runtime's initialize step, optionally refreshed, and discarded at
/// session end.
///
/// # Determinism
///
/// [`AccessState::resolve`] is a pure function: the same profile,
/// catalogs, and `now` produce a deep-equal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    /// Subscription plan tier.
    pub plan: Plan,
    /// The principal's role.
    pub role: Role,
    /// Effective feature set: cumulative plan features ∪ active grants.
    pub features: BTreeSet<FeatureKey>,
    /// The role's capability set.
    pub capabilities: BTreeSet<CapabilityKey>,
    /// `true` while a profile fetch is in flight.
    pub is_loading: bool,
    /// `true` once the initialize step has completed (even if it failed
    /// closed to the minimal state).
    pub is_initialized: bool,
}

impl AccessState {
    /// The minimal default state: lowest plan, least-privileged role,
    /// that role's capabilities only, no grant features.
    ///
    /// Used before initialization and as the fail-closed fallback when
    /// the profile fetch fails — a fetch failure never elevates access.
    #[must_use]
    pub fn minimal(catalog: &PlanCatalog, capabilities: &CapabilityMap) -> Self {
        Self {
            plan: Plan::Free,
            role: Role::Staff,
            features: catalog.cumulative_features(Plan::Free),
            capabilities: capabilities.capabilities_for(Role::Staff).clone(),
            is_loading: false,
            is_initialized: true,
        }
    }

    /// The pre-initialization state: minimal entitlements, flagged as
    /// loading and not yet initialized.
    #[must_use]
    pub fn loading(catalog: &PlanCatalog, capabilities: &CapabilityMap) -> Self {
        Self {
            is_loading: true,
            is_initialized: false,
            ..Self::minimal(catalog, capabilities)
        }
    }

    /// Resolves a profile into a complete access state.
    ///
    /// `features = cumulative_features(plan) ∪ active_features(grants, now)`;
    /// `capabilities = capabilities_for(role)`. Malformed grants are
    /// rejected wholesale during ingestion and contribute nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use plangate_core::{AccessState, AccountProfile, CapabilityMap, PlanCatalog};
    /// use plangate_types::{FeatureKey, Plan, Role};
    ///
    /// let catalog = PlanCatalog::default();
    /// let caps = CapabilityMap::default();
    /// let profile = AccountProfile::new(Plan::Growth, Role::Admin);
    ///
    /// let state = AccessState::resolve(&profile, &catalog, &caps, Utc::now());
    /// assert!(state.has_feature(&FeatureKey::new("fees.online").unwrap()));
    /// assert!(state.is_initialized);
    /// ```
    #[must_use]
    pub fn resolve(
        profile: &AccountProfile,
        catalog: &PlanCatalog,
        capabilities: &CapabilityMap,
        now: DateTime<Utc>,
    ) -> Self {
        let ledger = GrantLedger::ingest(profile.grants.clone());

        let mut features = catalog.cumulative_features(profile.plan);
        features.extend(ledger.active_features(now));

        Self {
            plan: profile.plan,
            role: profile.role,
            features,
            capabilities: capabilities.capabilities_for(profile.role).clone(),
            is_loading: false,
            is_initialized: true,
        }
    }

    /// Returns `true` if the effective feature set contains `feature`.
    #[must_use]
    pub fn has_feature(&self, feature: &FeatureKey) -> bool {
        self.features.contains(feature)
    }

    /// Returns `true` if the role's capability set grants `cap`
    /// (wildcard-aware).
    #[must_use]
    pub fn has_capability(&self, cap: &CapabilityKey) -> bool {
        cap.granted_by(&self.capabilities)
    }
}
