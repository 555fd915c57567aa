//! Telemetry event contract.
//!
//! Only the contract lives here; delivery is a trait seam. Downstream
//! analytics key on the exact event names and payload fields, so both
//! are fixed:
//!
//! | Event | Emitted when |
//! |-------|--------------|
//! | `route_locked` | A route evaluation is denied |
//! | `feature_locked_viewed` | A locked feature gate renders its fallback |
//! | `feature_unlocked` | A refresh adds a feature to the effective set |
//! | `feature_locked` | A refresh removes a feature from the effective set |
//! | `trial_expired` | A refresh removes a feature a trial grant supplied |
//! | `action_locked` | An action gate is denied on the capability axis |
//! | `upgrade_shown` | An upgrade prompt is rendered |
//! | `upgrade_clicked` | An upgrade prompt is clicked |
//!
//! Payload: `{ plan, needed_plan?, feature?, capability?, context,
//! timestamp }`.

use chrono::{DateTime, Utc};
use plangate_core::DenialReason;
use plangate_types::{CapabilityKey, FeatureKey, Plan};
use serde::{Deserialize, Serialize};

/// The fixed event-name vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    /// Route evaluation denied.
    RouteLocked,
    /// Locked feature gate rendered its fallback.
    FeatureLockedViewed,
    /// Feature appeared in the effective set after a refresh.
    FeatureUnlocked,
    /// Feature disappeared from the effective set after a refresh.
    FeatureLocked,
    /// A trial grant's feature disappeared after a refresh.
    TrialExpired,
    /// Action gate denied on the capability axis.
    ActionLocked,
    /// Upgrade prompt rendered.
    UpgradeShown,
    /// Upgrade prompt clicked.
    UpgradeClicked,
}

impl TelemetryKind {
    /// Returns the exact wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TelemetryKind::RouteLocked => "route_locked",
            TelemetryKind::FeatureLockedViewed => "feature_locked_viewed",
            TelemetryKind::FeatureUnlocked => "feature_unlocked",
            TelemetryKind::FeatureLocked => "feature_locked",
            TelemetryKind::TrialExpired => "trial_expired",
            TelemetryKind::ActionLocked => "action_locked",
            TelemetryKind::UpgradeShown => "upgrade_shown",
            TelemetryKind::UpgradeClicked => "upgrade_clicked",
        }
    }
}

impl std::fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One telemetry event with its fixed payload.
///
/// # Example
///
/// ```
/// use plangate_runtime::{TelemetryEvent, TelemetryKind};
/// use plangate_types::{FeatureKey, Plan};
///
/// let event = TelemetryEvent::new(TelemetryKind::UpgradeShown, Plan::Starter, "fees_page")
///     .feature(FeatureKey::new("fees.online").unwrap())
///     .needed_plan(Plan::Growth);
/// assert_eq!(event.kind.as_str(), "upgrade_shown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event name.
    pub kind: TelemetryKind,
    /// The session's current plan.
    pub plan: Plan,
    /// The plan that would satisfy the gate, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needed_plan: Option<Plan>,
    /// The gated feature, when the feature axis is involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureKey>,
    /// The gated capability, when the capability axis is involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityKey>,
    /// Where the event happened (route path, widget name, …).
    pub context: String,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(kind: TelemetryKind, plan: Plan, context: impl Into<String>) -> Self {
        Self {
            kind,
            plan,
            needed_plan: None,
            feature: None,
            capability: None,
            context: context.into(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches the gated feature.
    #[must_use]
    pub fn feature(mut self, feature: FeatureKey) -> Self {
        self.feature = Some(feature);
        self
    }

    /// Attaches the gated capability.
    #[must_use]
    pub fn capability(mut self, capability: CapabilityKey) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Attaches the satisfying plan tier.
    #[must_use]
    pub fn needed_plan(mut self, plan: Plan) -> Self {
        self.needed_plan = Some(plan);
        self
    }

    /// Builds an event from a structured denial reason.
    ///
    /// Copies the failing-axis identifiers and the passed-through
    /// `needed_plan` into the payload.
    #[must_use]
    pub fn from_denial(
        kind: TelemetryKind,
        reason: &DenialReason,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            plan: reason.current_plan,
            needed_plan: reason.needed_plan,
            feature: reason.missing_feature.clone(),
            capability: reason.missing_capability.clone(),
            context: context.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Delivery seam for telemetry events.
///
/// Implementations forward to the analytics pipeline; emission sites
/// never depend on delivery succeeding.
pub trait TelemetryReporter: Send + Sync {
    /// Delivers one event.
    fn report(&self, event: TelemetryEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl TelemetryReporter for NoopReporter {
    fn report(&self, _event: TelemetryEvent) {}
}

/// Records events in memory for inspection.
///
/// Test double for asserting on emission counts and payloads.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: parking_lot::Mutex<Vec<TelemetryEvent>>,
}

impl RecordingReporter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Returns the recorded event names, in emission order.
    #[must_use]
    pub fn kinds(&self) -> Vec<TelemetryKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TelemetryReporter for RecordingReporter {
    fn report(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}
