//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a monitoring run.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for a monitoring run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Where the target list is read from.
    pub targets: TargetsConfig,

    /// Where and how the report is written.
    pub report: ReportConfig,

    /// Single-attempt probe settings.
    pub probe: ProbeConfig,

    /// Retry policy applied per target.
    pub retry: RetryConfig,

    /// Worker pool settings.
    pub concurrency: ConcurrencyConfig,

    /// Basic-auth credentials keyed by URL substrings.
    pub credentials: Vec<CredentialRule>,

    /// Transport failure reasons containing any of these are dropped from the report.
    pub suppress: Vec<String>,

    /// Notification settings.
    pub notify: NotifyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Target list source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Newline-delimited target file.
    pub path: PathBuf,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("websites.txt"),
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Report sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// File the report is written to at the end of the run.
    pub path: PathBuf,

    /// Include healthy targets below the separator.
    pub verbose: bool,

    /// Output format.
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("website_status_message.txt"),
            verbose: false,
            format: ReportFormat::Text,
        }
    }
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every probe.
    pub user_agent: String,

    /// Route probes through the proxy named in the environment.
    pub system_proxy: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("sitewatch/{}", env!("CARGO_PKG_VERSION")),
            system_proxy: true,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Probe attempts per target (1 disables retries).
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

/// Execution strategy for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// Tasks on the shared runtime.
    #[default]
    Thread,
    /// Isolated workers, each with its own OS thread, runtime and HTTP client.
    Process,
}

/// Concurrency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Selected strategy.
    pub mode: ConcurrencyMode,

    /// Maximum in-flight targets in thread mode.
    pub thread_workers: usize,

    /// Worker count in process mode. Defaults to `min(8, available cores)`.
    pub process_workers: Option<usize>,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            mode: ConcurrencyMode::Thread,
            thread_workers: 10,
            process_workers: None,
        }
    }
}

impl ConcurrencyConfig {
    /// Effective pool width for the configured mode.
    pub fn width(&self) -> usize {
        match self.mode {
            ConcurrencyMode::Thread => self.thread_workers,
            ConcurrencyMode::Process => self.process_workers.unwrap_or_else(default_process_workers),
        }
    }
}

fn default_process_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.min(8)
}

/// Basic-auth credentials registered for every target containing one of `patterns`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialRule {
    /// Substrings matched against the normalized URL.
    pub patterns: Vec<String>,

    /// Realm the credential answers for. `None` answers any realm.
    #[serde(default)]
    pub realm: Option<String>,

    pub username: String,

    pub password: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Mail transport command; receives the report on stdin.
    pub program: String,

    /// Subject line.
    pub subject: String,

    /// Fixed recipient list.
    pub recipients: Vec<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            program: "mail".to_string(),
            subject: "Daily Website Status Check".to_string(),
            recipients: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
