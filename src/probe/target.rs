//! Health-check targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A host or URL to be checked.
///
/// The raw input is kept for logging; probes always use the normalized URL,
/// which carries an explicit scheme (`https://` when none was given).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    raw: String,
    url: String,
}

impl Target {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        let url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };
        Self { raw, url }
    }

    /// The target exactly as it was read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized absolute URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl From<&str> for Target {
    fn from(raw: &str) -> Self {
        Target::new(raw)
    }
}
