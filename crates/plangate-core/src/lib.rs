//! Plangate core — entitlement resolution for plan/feature/capability
//! gating.
//!
//! This crate holds everything that can be computed without I/O: the
//! versioned catalogs, the time-bounded grant ledger, session access
//! state resolution, and the pure three-axis access check.
//!
//! # Crate Architecture
//!
//! ```text
//! plangate-types (Plan, Role, FeatureKey, CapabilityKey)
//!         ↓
//! plangate-core  ◄── THIS CRATE
//!     PlanCatalog, CapabilityMap, AddonCatalog   (versioned data)
//!     FeatureGrant, GrantLedger                  (time-bounded grants)
//!     AccessState, AccountProfile                (resolved session state)
//!     check()                                    (pure decision function)
//!         ↓
//! plangate-runtime (async assembly, route authorization, telemetry)
//! ```
//!
//! # Resolution Flow
//!
//! ```text
//! AccountProfile { plan, role, grants }
//!     │
//!     ├── PlanCatalog::cumulative_features(plan) ─┐
//!     ├── GrantLedger::active_features(grants, now) ─┴─► state.features
//!     └── CapabilityMap::capabilities_for(role) ────► state.capabilities
//!
//! check(state, request) -> AccessCheckResult { allowed, reason? }
//! ```
//!
//! # Design Principles
//!
//! - **Pure resolution** — `now` is always an explicit parameter; the
//!   same profile and clock always yield a deep-equal [`AccessState`]
//! - **Additive grants** — grants only ever widen the effective feature
//!   set, never narrow it
//! - **Fail loudly at the boundary** — unknown plans/roles and malformed
//!   grants are rejected before they reach the checker; `check()` itself
//!   is total and never errors
//! - **Catalogs are data** — the tier table, role map, and add-on
//!   registry are versioned serde data with compiled-in defaults,
//!   overridable from TOML without touching the resolution algorithm

pub mod addon;
pub mod audit;
pub mod capability_map;
pub mod checker;
pub mod error;
pub mod grant;
pub mod ledger;
pub mod plan_catalog;
pub mod profile;
pub mod state;

pub use addon::{required_plan_for, AddonCatalog, AddonConfig};
pub use audit::{audit_keys, verify_capability_keys, verify_feature_keys, AuditReport};
pub use capability_map::CapabilityMap;
pub use checker::{check, AccessCheckRequest, AccessCheckResult, DenialReason, FailedAxis};
pub use error::{CatalogError, ConfigurationGap, MalformedGrant, ProfileError};
pub use grant::{FeatureGrant, GrantReason};
pub use ledger::{active_features, GrantLedger};
pub use plan_catalog::PlanCatalog;
pub use profile::{AccountProfile, RawProfile};
pub use state::AccessState;

// Re-export the shared vocabulary for convenience.
pub use plangate_types::{CapabilityKey, ErrorCode, FeatureKey, Plan, Role};
