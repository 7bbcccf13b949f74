//! Probe subsystem.
//!
//! # Data Flow
//! ```text
//! Target (raw line)
//!     → target.rs (normalize to absolute URL)
//!     → credentials.rs (fresh per-request context from matching rules)
//!     → http.rs (single GET, optional Basic handshake)
//!     → outcome.rs (classified Outcome)
//! ```
//!
//! # Design Decisions
//! - Exactly one network attempt per call; retries live in `resilience`
//! - Failures are values, never errors: every call yields an Outcome
//! - No state shared between calls beyond read-only settings

use std::future::Future;

pub mod credentials;
pub mod http;
pub mod outcome;
pub mod target;

#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use http::{HttpProbe, ProbeSettings};
pub use outcome::{Outcome, OutcomeKind};
pub use target::Target;

/// Error creating a probe handle.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A single liveness check against one target.
pub trait Probe: Send + Sync + 'static {
    /// Run one attempt and classify it.
    fn check(&self, target: &Target) -> impl Future<Output = Outcome> + Send;
}
