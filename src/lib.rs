//! Concurrent website liveness checker library.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod probe;
pub mod report;
pub mod resilience;
pub mod targets;

pub use config::schema::MonitorConfig;
pub use dispatch::Dispatcher;
pub use lifecycle::Monitor;
pub use probe::{Outcome, Target};
pub use report::Report;
