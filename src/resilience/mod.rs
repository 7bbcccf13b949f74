//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Target from dispatcher:
//!     → retries.rs (probe, delay, probe again; stop on 200)
//!     → consensus.rs (reduce attempt set to one Outcome)
//!     → back to dispatcher
//! ```
//!
//! # Design Decisions
//! - Timeouts are enforced by the probe; every attempt has a deadline
//! - Attempts for one target are strictly sequential
//! - Consensus is a pure function over the attempt set

pub mod consensus;
pub mod retries;

pub use consensus::consensus;
pub use retries::{RetryPolicy, RetryResolver};
