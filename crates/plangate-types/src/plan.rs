//! Subscription plan tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A subscription plan tier with a total order.
///
/// Tiers are strictly ordered by rank (`free` = 0 … `enterprise` = 4).
/// The cumulative feature set of a plan is the union of the base feature
/// lists of every tier ranked at or below it, so the resolved set is
/// monotone in rank: upgrading a plan never removes a feature.
///
/// # Ordering
///
/// `Ord` follows rank, which is what plan-axis checks rely on:
/// a request for `needed_plan = growth` passes iff
/// `state.plan >= Plan::Growth`.
///
/// # Example
///
/// ```
/// use plangate_types::Plan;
///
/// assert!(Plan::Free < Plan::Starter);
/// assert!(Plan::Enterprise > Plan::Scale);
/// assert_eq!(Plan::Growth.rank(), 2);
///
/// // Wire format is the lowercase name
/// let plan: Plan = "scale".parse().unwrap();
/// assert_eq!(plan, Plan::Scale);
/// assert!("platinum".parse::<Plan>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Entry tier, rank 0. The minimal default state uses this tier.
    #[default]
    Free,
    /// Rank 1.
    Starter,
    /// Rank 2.
    Growth,
    /// Rank 3.
    Scale,
    /// Rank 4, highest tier.
    Enterprise,
}

impl Plan {
    /// All tiers in rank order, lowest first.
    pub const ALL: [Plan; 5] = [
        Plan::Free,
        Plan::Starter,
        Plan::Growth,
        Plan::Scale,
        Plan::Enterprise,
    ];

    /// Returns the numeric rank of this tier (0 = lowest).
    ///
    /// # Example
    ///
    /// ```
    /// use plangate_types::Plan;
    ///
    /// assert_eq!(Plan::Free.rank(), 0);
    /// assert_eq!(Plan::Enterprise.rank(), 4);
    /// ```
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this tier satisfies a required tier.
    ///
    /// # Example
    ///
    /// ```
    /// use plangate_types::Plan;
    ///
    /// assert!(Plan::Scale.satisfies(Plan::Growth));
    /// assert!(Plan::Growth.satisfies(Plan::Growth));
    /// assert!(!Plan::Starter.satisfies(Plan::Growth));
    /// ```
    #[must_use]
    pub fn satisfies(self, required: Plan) -> bool {
        self >= required
    }

    /// Returns the lowercase wire name of this tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Growth => "growth",
            Plan::Scale => "scale",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown plan name at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}'")]
pub struct UnknownPlan(pub String);

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "growth" => Ok(Plan::Growth),
            "scale" => Ok(Plan::Scale),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_total_order() {
        let ranks: Vec<u8> = Plan::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);

        for window in Plan::ALL.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn satisfies_follows_rank() {
        assert!(Plan::Enterprise.satisfies(Plan::Free));
        assert!(Plan::Growth.satisfies(Plan::Growth));
        assert!(!Plan::Free.satisfies(Plan::Starter));
    }

    #[test]
    fn default_is_lowest_tier() {
        assert_eq!(Plan::default(), Plan::Free);
    }

    #[test]
    fn parse_roundtrip() {
        for plan in Plan::ALL {
            let parsed: Plan = plan.as_str().parse().expect("known name");
            assert_eq!(parsed, plan);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "platinum".parse::<Plan>().unwrap_err();
        assert!(err.to_string().contains("platinum"));
        // Case-sensitive wire format
        assert!("Growth".parse::<Plan>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Plan::Growth).expect("serialize");
        assert_eq!(json, r#""growth""#);

        let plan: Plan = serde_json::from_str(r#""enterprise""#).expect("deserialize");
        assert_eq!(plan, Plan::Enterprise);
    }

    #[test]
    fn serde_rejects_unknown_tier() {
        let result: Result<Plan, _> = serde_json::from_str(r#""platinum""#);
        assert!(result.is_err());
    }
}
