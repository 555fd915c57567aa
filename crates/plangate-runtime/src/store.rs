//! Session access-state store.
//!
//! One [`AccessStore`] per logical session. It owns the current
//! [`AccessState`] snapshot and the async fetch that populates it.
//!
//! # Concurrency Model
//!
//! ```text
//! readers ──► snapshot() ──► Arc<AccessState>   (lock held for a clone)
//!
//! refresh() ──► in_flight CAS ──► fetch (timeout) ──► install
//!                   │                                    │
//!                   └─ already set: coalesce, return     └─ generation
//!                      current snapshot                     mismatch:
//!                                                           discard
//! ```
//!
//! - State replacement is an atomic `Arc` swap; a reader sees the prior
//!   complete state or the fully-updated one, never a partial mix.
//! - At most one fetch is in flight; a refresh requested while one is
//!   pending is coalesced (ignored), not queued.
//! - A monotonic generation counter guards installs: a completion that
//!   started before the latest [`AccessStore::reset`] is discarded.
//! - Fetch failure or timeout fails closed to [`AccessState::minimal`]
//!   with `is_initialized = true`. Never blocks indefinitely, never
//!   fails open.

use crate::error::ProfileFetchFailure;
use crate::source::ProfileSource;
use chrono::Utc;
use parking_lot::RwLock;
use plangate_core::{AccessState, CapabilityMap, PlanCatalog};
use plangate_types::ErrorCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessStoreConfig {
    /// Profile fetch timeout in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for AccessStoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5_000,
        }
    }
}

impl AccessStoreConfig {
    /// The fetch timeout as a [`Duration`].
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Holder of one session's resolved access state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use plangate_core::{AccountProfile, CapabilityMap, PlanCatalog};
/// use plangate_runtime::{AccessStore, AccessStoreConfig, StaticProfileSource};
/// use plangate_types::{Plan, Role};
///
/// # tokio_test::block_on(async {
/// let source = StaticProfileSource::new(AccountProfile::new(Plan::Growth, Role::Admin));
/// let store = AccessStore::new(
///     Arc::new(source),
///     Arc::new(PlanCatalog::default()),
///     Arc::new(CapabilityMap::default()),
///     AccessStoreConfig::default(),
/// );
///
/// assert!(!store.snapshot().is_initialized);
/// let state = store.initialize().await;
/// assert_eq!(state.plan, Plan::Growth);
/// # });
/// ```
pub struct AccessStore {
    source: Arc<dyn ProfileSource>,
    catalog: Arc<PlanCatalog>,
    capabilities: Arc<CapabilityMap>,
    fetch_timeout: Duration,
    state: RwLock<Arc<AccessState>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
}

impl AccessStore {
    /// Creates a store in the loading state.
    #[must_use]
    pub fn new(
        source: Arc<dyn ProfileSource>,
        catalog: Arc<PlanCatalog>,
        capabilities: Arc<CapabilityMap>,
        config: AccessStoreConfig,
    ) -> Self {
        let initial = AccessState::loading(&catalog, &capabilities);
        Self {
            source,
            catalog,
            capabilities,
            fetch_timeout: config.fetch_timeout(),
            state: RwLock::new(Arc::new(initial)),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the current snapshot.
    ///
    /// Cheap: clones the `Arc`, not the state. The snapshot is immutable
    /// and safe to check against without further locking.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AccessState> {
        Arc::clone(&self.state.read())
    }

    /// Populates the store once.
    ///
    /// Fetches only if the store has never resolved; a second call
    /// returns the existing snapshot. Use [`AccessStore::refresh`] to
    /// re-fetch after entitlements change.
    pub async fn initialize(&self) -> Arc<AccessState> {
        let current = self.snapshot();
        if current.is_initialized {
            return current;
        }
        self.refresh().await
    }

    /// Re-fetches the profile and swaps in a freshly resolved state.
    ///
    /// Returns the snapshot current after this call. A refresh requested
    /// while another is in flight is coalesced: it does not queue a
    /// second fetch, it returns the current snapshot immediately.
    ///
    /// On fetch failure or timeout the store fails closed to
    /// [`AccessState::minimal`] (logged at `error`), so a broken profile
    /// service can deny access but never widen it.
    pub async fn refresh(&self) -> Arc<AccessState> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("refresh already in flight; coalescing");
            return self.snapshot();
        }

        // Held across the await: a caller dropping this future mid-fetch
        // must release the flag, or every later refresh would coalesce
        // against a fetch that no longer exists.
        let _in_flight = InFlightGuard(&self.in_flight);

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let resolved = match tokio::time::timeout(self.fetch_timeout, self.source.fetch_profile())
            .await
        {
            Ok(Ok(profile)) => {
                AccessState::resolve(&profile, &self.catalog, &self.capabilities, Utc::now())
            }
            Ok(Err(err)) => self.fail_closed(&err),
            Err(_) => self.fail_closed(&ProfileFetchFailure::Timeout {
                timeout: self.fetch_timeout,
            }),
        };

        self.install(generation, resolved)
    }

    /// Discards session state, returning the store to loading.
    ///
    /// Bumps the generation so a fetch still in flight installs nothing
    /// when it completes.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let loading = AccessState::loading(&self.catalog, &self.capabilities);
        *self.state.write() = Arc::new(loading);
        tracing::debug!("access store reset to loading");
    }

    fn fail_closed(&self, err: &ProfileFetchFailure) -> AccessState {
        tracing::error!(
            error = %err,
            code = err.code(),
            recoverable = err.is_recoverable(),
            "profile fetch failed; failing closed to minimal access"
        );
        AccessState::minimal(&self.catalog, &self.capabilities)
    }

    fn install(&self, generation: u64, resolved: AccessState) -> Arc<AccessState> {
        let mut slot = self.state.write();
        if self.generation.load(Ordering::Acquire) == generation {
            *slot = Arc::new(resolved);
        } else {
            tracing::debug!(generation, "discarding stale refresh completion");
        }
        Arc::clone(&slot)
    }
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for AccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessStore")
            .field("fetch_timeout", &self.fetch_timeout)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticProfileSource;
    use async_trait::async_trait;
    use plangate_core::AccountProfile;
    use plangate_types::{FeatureKey, Plan, Role};
    use std::sync::atomic::AtomicUsize;

    struct SlowSource {
        profile: AccountProfile,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl SlowSource {
        fn new(profile: AccountProfile, delay: Duration) -> Self {
            Self {
                profile,
                delay,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProfileSource for SlowSource {
        async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.profile.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ProfileSource for FailingSource {
        async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure> {
            Err(ProfileFetchFailure::unavailable("503 from profile service"))
        }
    }

    fn store_with(source: Arc<dyn ProfileSource>, timeout_ms: u64) -> AccessStore {
        AccessStore::new(
            source,
            Arc::new(PlanCatalog::default()),
            Arc::new(CapabilityMap::default()),
            AccessStoreConfig {
                fetch_timeout_ms: timeout_ms,
            },
        )
    }

    fn feature(s: &str) -> FeatureKey {
        FeatureKey::new(s).expect("valid feature")
    }

    #[tokio::test]
    async fn starts_loading_then_initializes() {
        let source = StaticProfileSource::new(AccountProfile::new(Plan::Growth, Role::Admin));
        let store = store_with(Arc::new(source), 5_000);

        let before = store.snapshot();
        assert!(before.is_loading);
        assert!(!before.is_initialized);

        let after = store.initialize().await;
        assert_eq!(after.plan, Plan::Growth);
        assert!(after.is_initialized);
        assert!(!after.is_loading);
        assert!(after.has_feature(&feature("fees.online")));
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let source = Arc::new(SlowSource::new(
            AccountProfile::new(Plan::Starter, Role::Staff),
            Duration::from_millis(0),
        ));
        let store = store_with(Arc::clone(&source) as Arc<dyn ProfileSource>, 5_000);

        store.initialize().await;
        store.initialize().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_fails_closed() {
        let store = store_with(Arc::new(FailingSource), 5_000);
        let state = store.initialize().await;

        assert_eq!(state.plan, Plan::Free);
        assert_eq!(state.role, Role::Staff);
        assert!(state.is_initialized);
        assert!(!state.is_loading);
        assert!(!state.has_feature(&feature("fees.online")));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_timeout_fails_closed() {
        let source = SlowSource::new(
            AccountProfile::new(Plan::Enterprise, Role::Owner),
            Duration::from_secs(60),
        );
        let store = store_with(Arc::new(source), 1_000);

        let state = store.initialize().await;
        // The slow fetch must not elevate access.
        assert_eq!(state.plan, Plan::Free);
        assert!(state.is_initialized);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refresh_is_coalesced() {
        let source = Arc::new(SlowSource::new(
            AccountProfile::new(Plan::Growth, Role::Admin),
            Duration::from_millis(50),
        ));
        let store = store_with(Arc::clone(&source) as Arc<dyn ProfileSource>, 5_000);

        let (a, b) = tokio::join!(store.refresh(), store.refresh());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // The coalesced call saw the still-loading snapshot; the real
        // one resolved.
        assert!(a.is_initialized || b.is_initialized);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_refresh_does_not_wedge_the_store() {
        let source = Arc::new(SlowSource::new(
            AccountProfile::new(Plan::Growth, Role::Admin),
            Duration::from_secs(1),
        ));
        let store = store_with(Arc::clone(&source) as Arc<dyn ProfileSource>, 5_000);

        // Caller abandons the refresh mid-fetch.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), store.refresh()).await;
        assert!(abandoned.is_err());

        // The dropped fetch must have released the in-flight flag: the
        // next call fetches for real instead of coalescing forever.
        let state = store.initialize().await;
        assert!(state.is_initialized);
        assert_eq!(state.plan, Plan::Growth);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_after_completion_fetches_again() {
        let source = Arc::new(SlowSource::new(
            AccountProfile::new(Plan::Scale, Role::Accountant),
            Duration::from_millis(0),
        ));
        let store = store_with(Arc::clone(&source) as Arc<dyn ProfileSource>, 5_000);

        store.refresh().await;
        store.refresh().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_never_overwrites_reset() {
        let source = SlowSource::new(
            AccountProfile::new(Plan::Enterprise, Role::Owner),
            Duration::from_millis(100),
        );
        let store = Arc::new(store_with(Arc::new(source), 5_000));

        let refreshing = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });
        tokio::task::yield_now().await;

        // Session ends while the fetch is still in flight.
        store.reset();

        refreshing.await.expect("refresh task");
        let state = store.snapshot();
        // The enterprise profile resolved after the reset and must have
        // been discarded.
        assert!(!state.is_initialized);
        assert_eq!(state.plan, Plan::Free);
    }

    #[tokio::test]
    async fn snapshot_swap_is_atomic() {
        let source = StaticProfileSource::new(AccountProfile::new(Plan::Growth, Role::Admin));
        let store = store_with(Arc::new(source), 5_000);

        let before = store.snapshot();
        store.refresh().await;
        let after = store.snapshot();

        // The old snapshot is untouched by the swap.
        assert!(before.is_loading);
        assert_eq!(before.plan, Plan::Free);
        assert_eq!(after.plan, Plan::Growth);
    }

    #[test]
    fn config_default_and_toml() {
        let config = AccessStoreConfig::default();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));

        let parsed: AccessStoreConfig =
            serde_json::from_str(r#"{"fetch_timeout_ms": 250}"#).expect("deserialize");
        assert_eq!(parsed.fetch_timeout(), Duration::from_millis(250));

        let empty: AccessStoreConfig = serde_json::from_str("{}").expect("defaults");
        assert_eq!(empty, config);
    }
}
