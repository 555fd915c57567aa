//! Time-bounded feature grants.
//!
//! A grant layers one feature on top of the plan's base set for a
//! bounded window. Grants are **additive only** — they widen the
//! effective feature set and can never narrow it.
//!
//! # Activity Window
//!
//! Half-open interval: a grant is active iff
//! `starts_at <= now < expires_at`. A grant whose `expires_at == now`
//! is already expired; a grant with no `expires_at` never expires.

use crate::error::MalformedGrant;
use chrono::{DateTime, Utc};
use plangate_types::FeatureKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Why a grant exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantReason {
    /// Purchased add-on.
    PaidAddon,
    /// Time-limited trial.
    Trial,
    /// Marketing promotion.
    Promo,
    /// Negotiated contract term.
    Contract,
    /// Granted by support staff.
    Support,
}

impl GrantReason {
    /// Returns the snake_case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GrantReason::PaidAddon => "paid_addon",
            GrantReason::Trial => "trial",
            GrantReason::Promo => "promo",
            GrantReason::Contract => "contract",
            GrantReason::Support => "support",
        }
    }
}

impl std::fmt::Display for GrantReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-bounded, additive feature grant.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use plangate_core::{FeatureGrant, GrantReason};
/// use plangate_types::FeatureKey;
///
/// let now = Utc::now();
/// let grant = FeatureGrant::new(
///     FeatureKey::new("fees.online").unwrap(),
///     GrantReason::Trial,
///     now - Duration::days(1),
///     Some(now + Duration::days(13)),
/// );
///
/// assert!(grant.is_active(now));
/// assert!(!grant.is_active(now + Duration::days(14)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGrant {
    /// Grant identifier.
    pub id: Uuid,
    /// The granted feature.
    pub feature: FeatureKey,
    /// Why the grant exists.
    pub reason: GrantReason,
    /// Who issued the grant (support agent, billing system, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
    /// Window start (inclusive).
    pub starts_at: DateTime<Utc>,
    /// Window end (exclusive). `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Arbitrary metadata (billing references, campaign tags, …).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl FeatureGrant {
    /// Creates a grant with a fresh id and no issuer/metadata.
    #[must_use]
    pub fn new(
        feature: FeatureKey,
        reason: GrantReason,
        starts_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            feature,
            reason,
            granted_by: None,
            starts_at,
            expires_at,
            metadata: BTreeMap::new(),
        }
    }

    /// Records who issued the grant.
    #[must_use]
    pub fn granted_by(mut self, issuer: impl Into<String>) -> Self {
        self.granted_by = Some(issuer.into());
        self
    }

    /// Returns `true` if the grant is active at `now`.
    ///
    /// Half-open window: `starts_at <= now < expires_at`. Never reads a
    /// hidden clock — `now` is always explicit.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if now < self.starts_at {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }

    /// Validates the grant window.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGrant`] if `starts_at` is after `expires_at`.
    /// (A missing feature key cannot occur: [`FeatureKey`] is validated
    /// at construction and deserialization.)
    pub fn validate(&self) -> Result<(), MalformedGrant> {
        if let Some(expires_at) = self.expires_at {
            if self.starts_at > expires_at {
                return Err(MalformedGrant {
                    id: self.id,
                    feature: self.feature.clone(),
                    starts_at: self.starts_at,
                    expires_at,
                });
            }
        }
        Ok(())
    }
}
