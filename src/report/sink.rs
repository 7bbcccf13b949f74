//! Report persistence.

use std::fs;
use std::path::PathBuf;

use crate::config::{ReportConfig, ReportFormat};
use crate::report::Report;

/// Error writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for the finished report. Called exactly once per run.
pub trait ReportSink: Send + Sync {
    fn write(&self, report: &Report) -> Result<(), ReportError>;
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(report.body()),
        ReportFormat::Json => {
            let mut json = if report.verbose {
                serde_json::to_string_pretty(report)?
            } else {
                // Healthy lines only appear in verbose reports.
                let terse = Report {
                    healthy_lines: Vec::new(),
                    ..report.clone()
                };
                serde_json::to_string_pretty(&terse)?
            };
            json.push('\n');
            Ok(json)
        }
    }
}

/// Writes the whole report to a file in one go, replacing any previous one.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: ReportFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.path.clone(), config.format)
    }
}

impl ReportSink for FileSink {
    fn write(&self, report: &Report) -> Result<(), ReportError> {
        let content = render(report, self.format)?;
        fs::write(&self.path, content).map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}
