//! Principal roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A principal's role within an account.
///
/// Each role maps to exactly one capability set (see the capability map
/// in `plangate-core`). There are no multi-role accounts and no role
/// inheritance: a principal has one role, and that role's set is the
/// whole answer for the capability axis.
///
/// `Staff` is the least-privileged role and is used for the minimal
/// default access state before a profile has been fetched.
///
/// # Example
///
/// ```
/// use plangate_types::Role;
///
/// let role: Role = "teacher".parse().unwrap();
/// assert_eq!(role, Role::Teacher);
/// assert!("superuser".parse::<Role>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Account owner. The only role mapped to the `"*"` wildcard.
    Owner,
    /// Administrative staff with broad management capabilities.
    Admin,
    /// Finance staff.
    Accountant,
    /// Teaching staff.
    Teacher,
    /// General staff, least privileged. Default for unresolved sessions.
    #[default]
    Staff,
}

impl Role {
    /// All roles.
    pub const ALL: [Role; 5] = [
        Role::Owner,
        Role::Admin,
        Role::Accountant,
        Role::Teacher,
        Role::Staff,
    ];

    /// Returns the lowercase wire name of this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::Teacher => "teacher",
            Role::Staff => "staff",
        }
    }

    /// Returns `true` for the account owner role.
    #[must_use]
    pub fn is_owner(self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown role name at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "accountant" => Ok(Role::Accountant),
            "teacher" => Ok(Role::Teacher),
            "staff" => Ok(Role::Staff),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
