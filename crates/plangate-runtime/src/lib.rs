//! Plangate runtime — async assembly and the navigation-facing surface.
//!
//! Everything here sits between the pure core and the outside world:
//! the profile fetch, the per-session state store, route authorization,
//! and the telemetry contract.
//!
//! # Architecture
//!
//! ```text
//! ProfileSource (async trait) ──► AccessStore ──► Arc<AccessState>
//!                                                      │
//!                    RouteAuthorizer / Gate ◄──────────┘
//!                            │
//!                            ▼
//!                   TelemetryReporter (trait)
//! ```
//!
//! # Components
//!
//! | Component | Responsibility |
//! |-----------|----------------|
//! | [`ProfileSource`] | The only suspending operation: fetch the profile |
//! | [`AccessStore`] | Atomic snapshot swap, refresh coalescing, fail-closed fallback |
//! | [`RouteAuthorizer`] | Auth readiness + access check → navigation decision |
//! | [`Gate`] | View-layer allow/deny with telemetry emission |
//! | [`TelemetryReporter`] | Delivery seam for the fixed event vocabulary |

pub mod authorizer;
pub mod error;
pub mod gate;
pub mod source;
pub mod store;
pub mod telemetry;

pub use authorizer::{AuthStatus, RouteAuthorizer, RouteEvaluation, RouteRequest};
pub use error::ProfileFetchFailure;
pub use gate::Gate;
pub use source::{ProfileSource, StaticProfileSource};
pub use store::{AccessStore, AccessStoreConfig};
pub use telemetry::{
    NoopReporter, RecordingReporter, TelemetryEvent, TelemetryKind, TelemetryReporter,
};
