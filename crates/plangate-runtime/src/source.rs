//! The profile-service seam.
//!
//! Fetching the account profile is the only suspending operation in the
//! whole pipeline. [`ProfileSource`] abstracts the transport so the
//! store can be exercised against an in-memory source in tests and an
//! HTTP client in production.

use crate::error::ProfileFetchFailure;
use async_trait::async_trait;
use plangate_core::AccountProfile;

/// Async access to the external account/profile service.
///
/// Implementations own transport, authentication, and retries. The
/// store adds the timeout; sources should not race their own.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetches the current account profile for this session's
    /// principal.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileFetchFailure`] when the service is unreachable
    /// or answers with an invalid profile.
    async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure>;
}

/// A source that always returns the same profile.
///
/// Useful for single-tenant tools and tests where the profile is known
/// up front.
#[derive(Debug, Clone)]
pub struct StaticProfileSource {
    profile: AccountProfile,
}

impl StaticProfileSource {
    /// Wraps a fixed profile.
    #[must_use]
    pub fn new(profile: AccountProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn fetch_profile(&self) -> Result<AccountProfile, ProfileFetchFailure> {
        Ok(self.profile.clone())
    }
}
