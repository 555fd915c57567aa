//! Access-gated route authorization.
//!
//! Combines auth readiness with the pure access check into one
//! navigation decision:
//!
//! ```text
//! AuthPending ──auth ready──► AccessPending ──state ready──► Resolved{allowed}
//!     │                           │
//!     └──no principal──────┬──────┘
//!                          ▼
//!                   Unauthenticated  (redirect, preserving origin)
//! ```
//!
//! [`RouteAuthorizer::evaluate`] is re-run on every relevant input
//! change (navigation, auth transition, access refresh). It holds no
//! cached verdict, so a denial can never go stale; each denied
//! evaluation emits exactly one `route_locked` event.

use crate::telemetry::{TelemetryEvent, TelemetryKind, TelemetryReporter};
use plangate_core::{check, AccessCheckRequest, AccessState, DenialReason, FailedAxis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What the identity layer currently knows about the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// The identity layer has not answered yet.
    Pending,
    /// No principal is signed in.
    Unauthenticated,
    /// A principal is signed in.
    Authenticated,
}

/// One guarded route: where it is and what it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// The originating location, preserved across a login redirect.
    pub path: String,
    /// The access requirements to pass.
    pub requirement: AccessCheckRequest,
}

impl RouteRequest {
    /// A route with its requirements.
    #[must_use]
    pub fn new(path: impl Into<String>, requirement: AccessCheckRequest) -> Self {
        Self {
            path: path.into(),
            requirement,
        }
    }

    /// An unguarded route (vacuous requirement; still waits for auth
    /// and access readiness).
    #[must_use]
    pub fn open(path: impl Into<String>) -> Self {
        Self::new(path, AccessCheckRequest::new())
    }
}

/// The outcome of one route evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEvaluation {
    /// Waiting on the identity layer. Render loading, no telemetry.
    AuthPending,
    /// Authenticated, waiting on access-state initialization. Render
    /// loading, no telemetry.
    AccessPending,
    /// No principal. Redirect to login, preserving the origin.
    Unauthenticated {
        /// The location to return to after login.
        origin: String,
    },
    /// The check ran. `reason` is present iff `allowed == false`.
    Resolved {
        /// Whether the route may render.
        allowed: bool,
        /// The structured denial, present iff denied.
        reason: Option<DenialReason>,
    },
}

impl RouteEvaluation {
    /// Returns `true` while the decision is a loading indicator.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::AuthPending | Self::AccessPending)
    }

    /// Returns `true` if the route may render.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            Self::Resolved {
                allowed: true,
                ..
            }
        )
    }
}

/// Evaluates guarded routes and reports denials.
pub struct RouteAuthorizer {
    reporter: Arc<dyn TelemetryReporter>,
}

impl RouteAuthorizer {
    /// Creates an authorizer reporting through `reporter`.
    #[must_use]
    pub fn new(reporter: Arc<dyn TelemetryReporter>) -> Self {
        Self { reporter }
    }

    /// Evaluates one route against the current auth status and access
    /// snapshot.
    ///
    /// Stateless: the verdict is derived fresh from the inputs on every
    /// call. A denied evaluation emits exactly one `route_locked` event
    /// carrying the failing axes; pending and unauthenticated outcomes
    /// emit nothing.
    #[must_use]
    pub fn evaluate(
        &self,
        auth: AuthStatus,
        state: &AccessState,
        route: &RouteRequest,
    ) -> RouteEvaluation {
        match auth {
            AuthStatus::Unauthenticated => {
                tracing::info!(path = %route.path, "unauthenticated; redirecting to login");
                return RouteEvaluation::Unauthenticated {
                    origin: route.path.clone(),
                };
            }
            AuthStatus::Pending => return RouteEvaluation::AuthPending,
            AuthStatus::Authenticated => {}
        }

        if !state.is_initialized || state.is_loading {
            return RouteEvaluation::AccessPending;
        }

        let result = check(state, &route.requirement);
        match result.reason {
            None => RouteEvaluation::Resolved {
                allowed: true,
                reason: None,
            },
            Some(reason) => {
                let axis = reason.primary_axis().map(FailedAxis::as_str).unwrap_or("none");
                tracing::warn!(path = %route.path, axis, "route denied");
                self.reporter.report(TelemetryEvent::from_denial(
                    TelemetryKind::RouteLocked,
                    &reason,
                    route.path.clone(),
                ));
                RouteEvaluation::Resolved {
                    allowed: false,
                    reason: Some(reason),
                }
            }
        }
    }
}

impl std::fmt::Debug for RouteAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteAuthorizer").finish_non_exhaustive()
    }
}
