//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → HTTP probe → Monitor
//!     (+ worker command for process mode)
//!
//! Run (run.rs):
//!     Load targets (fatal if unreadable/empty)
//!     → Dispatch (all workers joined)
//!     → Aggregate → Write report once
//!     → Notify when errored or forced
//! ```
//!
//! # Design Decisions
//! - Single writer: the report is written after the barrier join
//! - Notification failure is logged, the run still completes
//! - Each run carries a UUID for log correlation

pub mod run;
pub mod startup;

pub use run::{Monitor, RunError, RunOptions, RunSummary};
pub use startup::{build_monitor, StartupError};
