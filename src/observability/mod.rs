//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events on stderr)
//!
//! Spans:
//!     run (run_id) → dispatch → per-attempt events
//! ```
//!
//! # Design Decisions
//! - Structured fields (url, status, attempt) over formatted strings
//! - Run ID flows through every task and worker thread

pub mod logging;
