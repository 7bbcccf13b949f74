//! Target list input.
//!
//! # Responsibilities
//! - Read the newline-delimited target list once per run
//! - Skip blank lines and `#` comments
//! - Treat an unreadable or empty list as fatal

use std::fs;
use std::path::PathBuf;

use crate::probe::Target;

/// Error loading targets. Both variants abort the run before probing.
#[derive(Debug, thiserror::Error)]
pub enum TargetsError {
    #[error("failed to read target list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no targets found in {0}")]
    Empty(String),
}

/// Source of the target list.
pub trait TargetSource: Send + Sync {
    fn load(&self) -> Result<Vec<Target>, TargetsError>;
}

/// Parse a target list. Lines are trimmed before the comment check.
pub fn parse_targets(content: &str) -> Vec<Target> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Target::new)
        .collect()
}

/// Target list read from a file.
#[derive(Debug, Clone)]
pub struct FileTargets {
    path: PathBuf,
}

impl FileTargets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetSource for FileTargets {
    fn load(&self) -> Result<Vec<Target>, TargetsError> {
        let content = fs::read_to_string(&self.path).map_err(|source| TargetsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let targets = parse_targets(&content);
        if targets.is_empty() {
            return Err(TargetsError::Empty(self.path.display().to_string()));
        }
        tracing::debug!(path = %self.path.display(), count = targets.len(), "Targets loaded");
        Ok(targets)
    }
}

/// Fixed in-memory target list.
#[derive(Debug, Clone, Default)]
pub struct StaticTargets(pub Vec<Target>);

impl TargetSource for StaticTargets {
    fn load(&self) -> Result<Vec<Target>, TargetsError> {
        if self.0.is_empty() {
            return Err(TargetsError::Empty("static target list".to_string()));
        }
        Ok(self.0.clone())
    }
}
