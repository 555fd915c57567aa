//! Core types for the plangate entitlement engine.
//!
//! This crate provides the foundational vocabulary shared by every
//! plangate layer: subscription tiers, roles, and validated feature and
//! capability keys.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  plangate-types  : Plan, Role, FeatureKey, CapabilityKey,   │
//! │                    ErrorCode                        ◄── HERE │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  plangate-core   : catalogs, grant ledger, AccessState,     │
//! │                    three-axis access check                  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  plangate-runtime: AccessStore, RouteAuthorizer, telemetry  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Three-Axis Entitlement Model
//!
//! ```text
//! Allowed = Feature(set membership) ∧ Capability(role set, "*" wildcard) ∧ Plan(rank order)
//! ```
//!
//! | Axis | Type | Controls |
//! |------|------|----------|
//! | [`FeatureKey`] | Validated string | Which product features are resolved for the session |
//! | [`CapabilityKey`] | Validated string | Which fine-grained actions the role permits |
//! | [`Plan`] | Ordered enum | Which subscription tier the account sits on |
//!
//! # Why Validated Keys?
//!
//! Feature and capability checks are string-equality checks. A typo in a
//! plain string produces an always-false gate that no compiler catches.
//! [`FeatureKey`] and [`CapabilityKey`] validate their shape at
//! construction so malformed keys fail loudly at the boundary instead.
//!
//! # Example
//!
//! ```
//! use plangate_types::{CapabilityKey, FeatureKey, Plan, Role};
//!
//! let plan: Plan = "growth".parse().unwrap();
//! assert!(plan > Plan::Starter);
//!
//! let feature = FeatureKey::new("fees.online").unwrap();
//! assert_eq!(feature.as_str(), "fees.online");
//!
//! let cap = CapabilityKey::wildcard();
//! assert!(cap.is_wildcard());
//!
//! assert_eq!(Role::Owner.to_string(), "owner");
//! ```

mod capability;
mod error;
mod feature;
mod plan;
mod role;

pub use capability::{CapabilityKey, WILDCARD};
pub use error::{assert_error_code, assert_error_codes, ErrorCode, KeyError};
pub use feature::FeatureKey;
pub use plan::{Plan, UnknownPlan};
pub use role::{Role, UnknownRole};
