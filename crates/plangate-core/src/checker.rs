//! The three-axis access check.
//!
//! ```text
//! allowed = featureOK ∧ capabilityOK ∧ planOK
//! ```
//!
//! All three axes are evaluated independently and combined with AND —
//! never OR. An axis the request does not supply is vacuously
//! satisfied, so the empty request is always allowed.
//!
//! [`check`] is pure and total: no I/O, no side effects, no failure
//! mode. Malformed input (unknown plans, invalid keys) is rejected at
//! the boundaries before a request can be built.

use crate::state::AccessState;
use plangate_types::{CapabilityKey, FeatureKey, Plan};
use serde::{Deserialize, Serialize};

/// One access-check request. Unsupplied axes are vacuously satisfied.
///
/// # Example
///
/// ```
/// use plangate_core::AccessCheckRequest;
/// use plangate_types::{FeatureKey, Plan};
///
/// let request = AccessCheckRequest::new()
///     .feature(FeatureKey::new("fees.online").unwrap())
///     .needed_plan(Plan::Growth);
/// assert!(request.capability.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessCheckRequest {
    /// Feature-axis requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureKey>,
    /// Capability-axis requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityKey>,
    /// Plan-axis requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needed_plan: Option<Plan>,
}

impl AccessCheckRequest {
    /// The vacuous request (always allowed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires feature membership.
    #[must_use]
    pub fn feature(mut self, feature: FeatureKey) -> Self {
        self.feature = Some(feature);
        self
    }

    /// Requires a capability.
    #[must_use]
    pub fn capability(mut self, capability: CapabilityKey) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Requires a minimum plan tier.
    #[must_use]
    pub fn needed_plan(mut self, plan: Plan) -> Self {
        self.needed_plan = Some(plan);
        self
    }
}

/// The axis that caused a denial, in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedAxis {
    /// Plan rank below the required tier.
    Plan,
    /// Capability not granted by the role's set.
    Capability,
    /// Feature not in the effective set.
    Feature,
}

impl FailedAxis {
    /// Returns the snake_case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailedAxis::Plan => "plan",
            FailedAxis::Capability => "capability",
            FailedAxis::Feature => "feature",
        }
    }
}

/// Why a check was denied.
///
/// `missing_feature`/`missing_capability` are set iff that axis failed.
/// `needed_plan` is the caller-supplied value passed through unchanged —
/// it is **not** recomputed from the catalog, so a caller that supplies
/// a tier disagreeing with the tier table reports the supplied tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialReason {
    /// The plan the session is on.
    pub current_plan: Plan,
    /// Set iff the feature axis failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_feature: Option<FeatureKey>,
    /// Set iff the capability axis failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_capability: Option<CapabilityKey>,
    /// The request's `needed_plan`, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needed_plan: Option<Plan>,
    /// Set iff the plan axis failed.
    #[serde(default)]
    pub plan_too_low: bool,
}

impl DenialReason {
    /// Returns the first failing axis by reporting priority:
    /// `plan > capability > feature`.
    ///
    /// A denial always has at least one failing axis, so this only
    /// returns `None` for a reason constructed by hand with no axis set.
    #[must_use]
    pub fn primary_axis(&self) -> Option<FailedAxis> {
        if self.plan_too_low {
            Some(FailedAxis::Plan)
        } else if self.missing_capability.is_some() {
            Some(FailedAxis::Capability)
        } else if self.missing_feature.is_some() {
            Some(FailedAxis::Feature)
        } else {
            None
        }
    }
}

/// The outcome of one access check.
///
/// `reason` is present iff `allowed == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheckResult {
    /// Whether the request passed all three axes.
    pub allowed: bool,
    /// The structured denial reason, present iff denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl AccessCheckResult {
    /// The allowed result.
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denied result with its reason.
    #[must_use]
    pub fn denied(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Returns `true` if the check passed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

/// Evaluates a request against a resolved access state.
///
/// Pure and referentially transparent: no I/O, no clock, no side
/// effects. The three axes are evaluated independently and combined
/// with AND; a vacuous request always passes.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use plangate_core::{check, AccessCheckRequest, AccessState, AccountProfile,
///                     CapabilityMap, PlanCatalog};
/// use plangate_types::{FeatureKey, Plan, Role};
///
/// let state = AccessState::resolve(
///     &AccountProfile::new(Plan::Growth, Role::Admin),
///     &PlanCatalog::default(),
///     &CapabilityMap::default(),
///     Utc::now(),
/// );
///
/// let request = AccessCheckRequest::new()
///     .feature(FeatureKey::new("fees.online").unwrap());
/// assert!(check(&state, &request).allowed);
/// ```
#[must_use]
pub fn check(state: &AccessState, request: &AccessCheckRequest) -> AccessCheckResult {
    let feature_ok = request
        .feature
        .as_ref()
        .map_or(true, |f| state.has_feature(f));
    let capability_ok = request
        .capability
        .as_ref()
        .map_or(true, |c| state.has_capability(c));
    let plan_ok = request
        .needed_plan
        .map_or(true, |needed| state.plan.satisfies(needed));

    if feature_ok && capability_ok && plan_ok {
        tracing::debug!(plan = %state.plan, role = %state.role, "access check allowed");
        return AccessCheckResult::allowed();
    }

    let reason = DenialReason {
        current_plan: state.plan,
        missing_feature: if feature_ok {
            None
        } else {
            request.feature.clone()
        },
        missing_capability: if capability_ok {
            None
        } else {
            request.capability.clone()
        },
        // Pass-through, never recomputed from the catalog.
        needed_plan: request.needed_plan,
        plan_too_low: !plan_ok,
    };

    tracing::warn!(
        plan = %state.plan,
        role = %state.role,
        axis = reason.primary_axis().map(FailedAxis::as_str).unwrap_or("none"),
        "access check denied"
    );

    AccessCheckResult::denied(reason)
}
