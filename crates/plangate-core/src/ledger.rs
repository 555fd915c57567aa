//! Grant ledger — validated grants and active-feature resolution.
//!
//! Ingestion is the single choke point where malformed grants are
//! rejected, wholesale: a grant with an inverted window is excluded
//! entirely, never partially applied. Everything downstream can assume
//! well-formed grants.
//!
//! Resolution is a pure function of the grants and an explicit `now` —
//! no hidden clock, so the same inputs always produce the same set.

use crate::error::MalformedGrant;
use crate::grant::FeatureGrant;
use chrono::{DateTime, Utc};
use plangate_types::FeatureKey;
use std::collections::BTreeSet;

/// Returns the de-duplicated set of features granted at `now`.
///
/// Filters to grants active at `now` (half-open window) and collapses
/// overlapping grants for the same feature into one entry.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use plangate_core::{active_features, FeatureGrant, GrantReason};
/// use plangate_types::FeatureKey;
///
/// let now = Utc::now();
/// let grants = vec![FeatureGrant::new(
///     FeatureKey::new("fees.online").unwrap(),
///     GrantReason::Trial,
///     now - Duration::days(1),
///     Some(now + Duration::days(1)),
/// )];
///
/// assert_eq!(active_features(&grants, now).len(), 1);
/// assert!(active_features(&grants, now + Duration::days(2)).is_empty());
/// ```
#[must_use]
pub fn active_features(grants: &[FeatureGrant], now: DateTime<Utc>) -> BTreeSet<FeatureKey> {
    grants
        .iter()
        .filter(|g| g.is_active(now))
        .map(|g| g.feature.clone())
        .collect()
}

/// A validated collection of feature grants.
///
/// [`GrantLedger::ingest`] splits raw grants into accepted and rejected;
/// rejected grants are kept for inspection (and logged) but never
/// contribute to resolution.
#[derive(Debug, Clone, Default)]
pub struct GrantLedger {
    grants: Vec<FeatureGrant>,
    rejected: Vec<(FeatureGrant, MalformedGrant)>,
}

impl GrantLedger {
    /// Ingests raw grants, rejecting malformed ones wholesale.
    ///
    /// Each rejection is logged at `warn` with the grant id and the
    /// reason; the remaining grants are all well-formed.
    #[must_use]
    pub fn ingest(raw: Vec<FeatureGrant>) -> Self {
        let mut grants = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();

        for grant in raw {
            match grant.validate() {
                Ok(()) => grants.push(grant),
                Err(err) => {
                    tracing::warn!(
                        grant_id = %grant.id,
                        feature = %grant.feature,
                        error = %err,
                        "rejecting malformed grant at ingestion"
                    );
                    rejected.push((grant, err));
                }
            }
        }

        Self { grants, rejected }
    }

    /// The accepted, well-formed grants.
    #[must_use]
    pub fn grants(&self) -> &[FeatureGrant] {
        &self.grants
    }

    /// Grants rejected at ingestion, with the reason for each.
    #[must_use]
    pub fn rejected(&self) -> &[(FeatureGrant, MalformedGrant)] {
        &self.rejected
    }

    /// Returns the de-duplicated feature set granted at `now`.
    #[must_use]
    pub fn active_features(&self, now: DateTime<Utc>) -> BTreeSet<FeatureKey> {
        active_features(&self.grants, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::GrantReason;
    use chrono::Duration;

    fn feature(s: &str) -> FeatureKey {
        FeatureKey::new(s).expect("valid feature")
    }

    fn grant_between(
        key: &str,
        starts: DateTime<Utc>,
        expires: Option<DateTime<Utc>>,
    ) -> FeatureGrant {
        FeatureGrant::new(feature(key), GrantReason::Trial, starts, expires)
    }

    #[test]
    fn filters_to_active_window() {
        let now = Utc::now();
        let grants = vec![
            grant_between("fees.online", now - Duration::days(1), Some(now + Duration::days(1))),
            grant_between("messaging.sms", now + Duration::days(1), None), // not yet started
            grant_between("api.access", now - Duration::days(2), Some(now - Duration::days(1))), // expired
        ];

        let active = active_features(&grants, now);
        assert_eq!(active, [feature("fees.online")].into());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let grants = vec![grant_between("fees.online", now - Duration::days(1), Some(now))];
        assert!(active_features(&grants, now).is_empty());
    }

    #[test]
    fn overlapping_grants_collapse() {
        let now = Utc::now();
        let grants = vec![
            grant_between("fees.online", now - Duration::days(7), Some(now + Duration::days(7))),
            grant_between("fees.online", now - Duration::days(1), None),
        ];
        let active = active_features(&grants, now);
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn empty_grants_yield_empty_set() {
        assert!(active_features(&[], Utc::now()).is_empty());
    }

    #[test]
    fn pure_in_now() {
        let start = Utc::now();
        let grants = vec![grant_between("fees.online", start, Some(start + Duration::days(1)))];

        let at = start + Duration::hours(12);
        assert_eq!(active_features(&grants, at), active_features(&grants, at));
    }

    #[test]
    fn ingest_rejects_malformed_wholesale() {
        let now = Utc::now();
        let good = grant_between("fees.online", now, None);
        let bad = grant_between("messaging.sms", now, Some(now - Duration::days(1)));
        let bad_id = bad.id;

        let ledger = GrantLedger::ingest(vec![good.clone(), bad]);

        assert_eq!(ledger.grants(), &[good]);
        assert_eq!(ledger.rejected().len(), 1);
        assert_eq!(ledger.rejected()[0].1.id, bad_id);
        // The malformed grant contributes nothing, not even partially.
        assert!(!ledger.active_features(now).contains(&feature("messaging.sms")));
    }

    #[test]
    fn ledger_resolution_matches_free_function() {
        let now = Utc::now();
        let grants = vec![
            grant_between("fees.online", now - Duration::days(1), None),
            grant_between("api.access", now - Duration::days(1), None),
        ];
        let ledger = GrantLedger::ingest(grants.clone());
        assert_eq!(ledger.active_features(now), active_features(&grants, now));
    }
}
