//! Reporting subsystem.
//!
//! # Data Flow
//! ```text
//! all final Outcomes (barrier: dispatch finished)
//!     → aggregate.rs (drop suppressed, partition, error flag)
//!     → Report
//!     → sink.rs (render text/json, single write)
//! ```
//!
//! # Design Decisions
//! - Aggregation is a pure function of the complete outcome set
//! - Line order follows collection order; no sorting
//! - Healthy lines are always collected but only rendered when verbose

pub mod aggregate;
pub mod sink;

pub use aggregate::{aggregate, aggregate_at, Report};
pub use sink::{FileSink, ReportError, ReportSink};
