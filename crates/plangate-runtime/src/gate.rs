//! View-layer gate helpers.
//!
//! A gate is a pure caller of [`check`] plus the matching telemetry
//! emission. Presentation stays with the UI layer: the gate answers
//! allow/deny with a structured reason and reports the view-side
//! events; what to render is the caller's concern. State is an explicit
//! value passed in, never a hidden global.

use crate::telemetry::{TelemetryEvent, TelemetryKind, TelemetryReporter};
use plangate_core::{
    check, AccessCheckRequest, AccessCheckResult, AccessState, FeatureGrant, GrantReason,
};
use plangate_types::{CapabilityKey, FeatureKey, Plan};
use std::sync::Arc;

/// Emits gate decisions and their view-side telemetry.
pub struct Gate {
    reporter: Arc<dyn TelemetryReporter>,
}

impl Gate {
    /// Creates a gate reporting through `reporter`.
    #[must_use]
    pub fn new(reporter: Arc<dyn TelemetryReporter>) -> Self {
        Self { reporter }
    }

    /// Checks a feature gate.
    ///
    /// A denial means the gate renders its fallback, so it emits one
    /// `feature_locked_viewed` event.
    #[must_use]
    pub fn feature(
        &self,
        state: &AccessState,
        feature: FeatureKey,
        context: impl Into<String>,
    ) -> AccessCheckResult {
        let result = check(state, &AccessCheckRequest::new().feature(feature));
        if let Some(reason) = &result.reason {
            self.reporter.report(TelemetryEvent::from_denial(
                TelemetryKind::FeatureLockedViewed,
                reason,
                context,
            ));
        }
        result
    }

    /// Checks an action gate on the capability axis.
    ///
    /// Emits one `action_locked` event on denial.
    #[must_use]
    pub fn action(
        &self,
        state: &AccessState,
        capability: CapabilityKey,
        context: impl Into<String>,
    ) -> AccessCheckResult {
        let result = check(state, &AccessCheckRequest::new().capability(capability));
        if let Some(reason) = &result.reason {
            self.reporter.report(TelemetryEvent::from_denial(
                TelemetryKind::ActionLocked,
                reason,
                context,
            ));
        }
        result
    }

    /// Reports that an upgrade prompt was rendered.
    pub fn upgrade_shown(
        &self,
        state: &AccessState,
        feature: Option<FeatureKey>,
        needed_plan: Option<Plan>,
        context: impl Into<String>,
    ) {
        self.reporter
            .report(self.upgrade_event(TelemetryKind::UpgradeShown, state, feature, needed_plan, context));
    }

    /// Reports that an upgrade prompt was clicked.
    pub fn upgrade_clicked(
        &self,
        state: &AccessState,
        feature: Option<FeatureKey>,
        needed_plan: Option<Plan>,
        context: impl Into<String>,
    ) {
        self.reporter
            .report(self.upgrade_event(TelemetryKind::UpgradeClicked, state, feature, needed_plan, context));
    }

    /// Reports the feature-set delta of a refresh.
    ///
    /// Each gained feature emits `feature_unlocked`. Each lost feature
    /// emits `trial_expired` when a trial grant supplied it, otherwise
    /// `feature_locked`. `grants` are the grants the session held before
    /// the refresh.
    pub fn report_refresh(
        &self,
        before: &AccessState,
        after: &AccessState,
        grants: &[FeatureGrant],
        context: impl Into<String>,
    ) {
        let context = context.into();

        for gained in after.features.difference(&before.features) {
            self.reporter.report(
                TelemetryEvent::new(TelemetryKind::FeatureUnlocked, after.plan, context.clone())
                    .feature(gained.clone()),
            );
        }

        for lost in before.features.difference(&after.features) {
            let was_trial = grants
                .iter()
                .any(|g| g.reason == GrantReason::Trial && &g.feature == lost);
            let kind = if was_trial {
                TelemetryKind::TrialExpired
            } else {
                TelemetryKind::FeatureLocked
            };
            self.reporter.report(
                TelemetryEvent::new(kind, after.plan, context.clone()).feature(lost.clone()),
            );
        }
    }

    fn upgrade_event(
        &self,
        kind: TelemetryKind,
        state: &AccessState,
        feature: Option<FeatureKey>,
        needed_plan: Option<Plan>,
        context: impl Into<String>,
    ) -> TelemetryEvent {
        let mut event = TelemetryEvent::new(kind, state.plan, context);
        event.feature = feature;
        event.needed_plan = needed_plan;
        event
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate").finish_non_exhaustive()
    }
}
