//! End-to-end session flow tests.
//!
//! Exercises the full pipeline: profile fetch through the store,
//! resolution into an access snapshot, route evaluation, gate checks,
//! and telemetry emission.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use plangate_core::{
    AccessCheckRequest, AccountProfile, CapabilityMap, FeatureGrant, GrantReason, PlanCatalog,
};
use plangate_runtime::{
    AccessStore, AccessStoreConfig, AuthStatus, Gate, ProfileFetchFailure, ProfileSource,
    RecordingReporter, RouteAuthorizer, RouteEvaluation, RouteRequest, StaticProfileSource,
    TelemetryKind, TelemetryReporter,
};
use plangate_types::{CapabilityKey, FeatureKey, Plan, Role};
use std::sync::Arc;

// =============================================================================
// Test Fixtures
// =============================================================================

fn feature(s: &str) -> FeatureKey {
    FeatureKey::new(s).expect("valid feature")
}

fn cap(s: &str) -> CapabilityKey {
    CapabilityKey::new(s).expect("valid capability")
}

fn store_for(profile: AccountProfile) -> AccessStore {
    AccessStore::new(
        Arc::new(StaticProfileSource::new(profile)),
        Arc::new(PlanCatalog::default()),
        Arc::new(CapabilityMap::default()),
        AccessStoreConfig::default(),
    )
}

fn authorizer() -> (Arc<RecordingReporter>, RouteAuthorizer) {
    let reporter = Arc::new(RecordingReporter::new());
    let authorizer = RouteAuthorizer::new(Arc::clone(&reporter) as Arc<dyn TelemetryReporter>);
    (reporter, authorizer)
}

struct FailingSource;

#[async_trait]
impl ProfileSource for FailingSource {
    async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure> {
        Err(ProfileFetchFailure::unavailable("profile service down"))
    }
}

// =============================================================================
// Access-Check Scenarios
// =============================================================================

#[tokio::test]
async fn growth_admin_reaches_online_fees() {
    let store = store_for(AccountProfile::new(Plan::Growth, Role::Admin));
    let state = store.initialize().await;

    let (reporter, authorizer) = authorizer();
    let route = RouteRequest::new(
        "/fees/online",
        AccessCheckRequest::new().feature(feature("fees.online")),
    );

    let evaluation = authorizer.evaluate(AuthStatus::Authenticated, &state, &route);
    assert!(evaluation.is_allowed());
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn starter_admin_denied_online_fees_with_reason() {
    let store = store_for(AccountProfile::new(Plan::Starter, Role::Admin));
    let state = store.initialize().await;

    let (reporter, authorizer) = authorizer();
    let route = RouteRequest::new(
        "/fees/online",
        AccessCheckRequest::new()
            .feature(feature("fees.online"))
            .needed_plan(Plan::Growth),
    );

    let RouteEvaluation::Resolved {
        allowed: false,
        reason: Some(reason),
    } = authorizer.evaluate(AuthStatus::Authenticated, &state, &route)
    else {
        panic!("expected denial");
    };
    assert_eq!(reason.current_plan, Plan::Starter);
    assert_eq!(reason.missing_feature, Some(feature("fees.online")));
    assert_eq!(reason.needed_plan, Some(Plan::Growth));

    let events = reporter.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TelemetryKind::RouteLocked);
    assert_eq!(events[0].plan, Plan::Starter);
    assert_eq!(events[0].needed_plan, Some(Plan::Growth));
}

#[tokio::test]
async fn teacher_denied_admissions_capability() {
    let store = store_for(AccountProfile::new(Plan::Enterprise, Role::Teacher));
    let state = store.initialize().await;

    let (_, authorizer) = authorizer();
    let route = RouteRequest::new(
        "/admissions",
        AccessCheckRequest::new().capability(cap("admissions.view")),
    );

    let RouteEvaluation::Resolved {
        allowed: false,
        reason: Some(reason),
    } = authorizer.evaluate(AuthStatus::Authenticated, &state, &route)
    else {
        panic!("expected denial");
    };
    assert_eq!(reason.missing_capability, Some(cap("admissions.view")));
    assert_eq!(reason.missing_feature, None);
}

#[tokio::test]
async fn trial_grant_unlocks_and_expires() {
    let now = Utc::now();
    let trial = FeatureGrant::new(
        feature("fees.online"),
        GrantReason::Trial,
        now - ChronoDuration::days(1),
        Some(now + ChronoDuration::days(1)),
    );
    let profile = AccountProfile::new(Plan::Free, Role::Admin).with_grants(vec![trial]);

    let store = store_for(profile.clone());
    let state = store.initialize().await;
    assert!(state.has_feature(&feature("fees.online")));

    // After the window closes, a fresh resolution drops the feature.
    let later = plangate_core::AccessState::resolve(
        &profile,
        &PlanCatalog::default(),
        &CapabilityMap::default(),
        now + ChronoDuration::days(2),
    );
    assert!(!later.has_feature(&feature("fees.online")));
}

#[tokio::test]
async fn auth_pending_wins_regardless_of_access_state() {
    let store = store_for(AccountProfile::new(Plan::Enterprise, Role::Owner));
    let state = store.initialize().await;

    let (reporter, authorizer) = authorizer();
    let route = RouteRequest::open("/dashboard");

    let evaluation = authorizer.evaluate(AuthStatus::Pending, &state, &route);
    assert_eq!(evaluation, RouteEvaluation::AuthPending);
    assert!(reporter.events().is_empty());
}

// =============================================================================
// Fail-Closed Behavior
// =============================================================================

#[tokio::test]
async fn broken_profile_service_denies_but_never_elevates() {
    let store = AccessStore::new(
        Arc::new(FailingSource),
        Arc::new(PlanCatalog::default()),
        Arc::new(CapabilityMap::default()),
        AccessStoreConfig::default(),
    );
    let state = store.initialize().await;

    // Initialized so routes resolve instead of spinning on loading.
    assert!(state.is_initialized);
    assert_eq!(state.plan, Plan::Free);

    let (_, authorizer) = authorizer();
    let locked = RouteRequest::new(
        "/reports/advanced",
        AccessCheckRequest::new().feature(feature("reports.advanced")),
    );
    let open = RouteRequest::new(
        "/reports/basic",
        AccessCheckRequest::new().feature(feature("reports.basic")),
    );

    assert!(!authorizer
        .evaluate(AuthStatus::Authenticated, &state, &locked)
        .is_allowed());
    // Free-tier content still renders on the minimal fallback.
    assert!(authorizer
        .evaluate(AuthStatus::Authenticated, &state, &open)
        .is_allowed());
}

// =============================================================================
// Upgrade Prompt Flow
// =============================================================================

#[tokio::test]
async fn denial_to_upgrade_click_emits_expected_sequence() {
    let store = store_for(AccountProfile::new(Plan::Starter, Role::Owner));
    let state = store.initialize().await;

    let reporter = Arc::new(RecordingReporter::new());
    let gate = Gate::new(Arc::clone(&reporter) as Arc<dyn TelemetryReporter>);

    let result = gate.feature(&state, feature("fees.online"), "fees_page");
    assert!(!result.allowed);

    gate.upgrade_shown(
        &state,
        Some(feature("fees.online")),
        Some(Plan::Growth),
        "fees_page",
    );
    gate.upgrade_clicked(
        &state,
        Some(feature("fees.online")),
        Some(Plan::Growth),
        "fees_page",
    );

    assert_eq!(
        reporter.kinds(),
        vec![
            TelemetryKind::FeatureLockedViewed,
            TelemetryKind::UpgradeShown,
            TelemetryKind::UpgradeClicked,
        ]
    );
    let shown = &reporter.events()[1];
    assert_eq!(shown.plan, Plan::Starter);
    assert_eq!(shown.needed_plan, Some(Plan::Growth));
    assert_eq!(shown.feature, Some(feature("fees.online")));
}

// =============================================================================
// Refresh Lifecycle
// =============================================================================

#[tokio::test]
async fn plan_upgrade_flips_route_from_denied_to_allowed() {
    struct SwitchingSource {
        upgraded: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl ProfileSource for SwitchingSource {
        async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure> {
            let plan = if self.upgraded.load(std::sync::atomic::Ordering::SeqCst) {
                Plan::Growth
            } else {
                Plan::Starter
            };
            Ok(AccountProfile::new(plan, Role::Admin))
        }
    }

    let source = Arc::new(SwitchingSource {
        upgraded: std::sync::atomic::AtomicBool::new(false),
    });
    let store = AccessStore::new(
        Arc::clone(&source) as Arc<dyn ProfileSource>,
        Arc::new(PlanCatalog::default()),
        Arc::new(CapabilityMap::default()),
        AccessStoreConfig::default(),
    );

    let (reporter, authorizer) = authorizer();
    let route = RouteRequest::new(
        "/fees/online",
        AccessCheckRequest::new()
            .feature(feature("fees.online"))
            .needed_plan(Plan::Growth),
    );

    let before = store.initialize().await;
    assert!(!authorizer
        .evaluate(AuthStatus::Authenticated, &before, &route)
        .is_allowed());

    // Billing upgrades the account; the session refreshes.
    source
        .upgraded
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let after = store.refresh().await;
    assert!(authorizer
        .evaluate(AuthStatus::Authenticated, &after, &route)
        .is_allowed());

    // Exactly the one denial was reported.
    assert_eq!(reporter.kinds(), vec![TelemetryKind::RouteLocked]);
}

#[tokio::test]
async fn session_end_discards_state() {
    let store = store_for(AccountProfile::new(Plan::Enterprise, Role::Owner));
    let state = store.initialize().await;
    assert_eq!(state.plan, Plan::Enterprise);

    store.reset();
    let after = store.snapshot();
    assert!(!after.is_initialized);
    assert_eq!(after.plan, Plan::Free);
}
