//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides applied, validated again
//!     → MonitorConfig (validated, immutable)
//!     → handed to the engine at construction time
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; one config per run
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ConcurrencyConfig;
pub use schema::ConcurrencyMode;
pub use schema::CredentialRule;
pub use schema::MonitorConfig;
pub use schema::NotifyConfig;
pub use schema::ProbeConfig;
pub use schema::ReportConfig;
pub use schema::ReportFormat;
pub use schema::RetryConfig;
pub use schema::TargetsConfig;
