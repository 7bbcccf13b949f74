//! Classified result of a probe attempt.

use serde::{Deserialize, Serialize};

use crate::probe::target::Target;

/// Column width the target is padded to in every status line.
pub const TARGET_COLUMN_WIDTH: usize = 50;

/// Failure taxonomy, plus the reachable case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Transport succeeded and a status code was obtained.
    Reachable,
    /// The server answered with an error status.
    Protocol,
    /// DNS, connect or timeout failure. No status code.
    Transport,
    /// A known-noisy transport failure that is dropped from reporting.
    Suppressed,
    /// Anything else that went wrong while probing.
    Unexpected,
}

/// The classified result of one probe attempt, or of a resolved attempt set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub target: Target,
    pub status_code: Option<u16>,
    pub succeeded: bool,
    pub message: String,
    /// Sentinel marker: never counted as healthy or unhealthy.
    pub suppressed: bool,
    pub kind: OutcomeKind,
}

/// `"<target padded to 50 cols> - <detail>"`.
pub fn status_line(target: &Target, detail: impl std::fmt::Display) -> String {
    format!("{:<width$} - {}", target.url(), detail, width = TARGET_COLUMN_WIDTH)
}

impl Outcome {
    pub fn reachable(target: &Target, code: u16) -> Self {
        Self {
            target: target.clone(),
            status_code: Some(code),
            succeeded: true,
            message: status_line(target, code),
            suppressed: false,
            kind: OutcomeKind::Reachable,
        }
    }

    pub fn protocol(target: &Target, code: u16) -> Self {
        Self {
            target: target.clone(),
            status_code: Some(code),
            succeeded: false,
            message: status_line(target, format_args!("HTTP Error: {}", code)),
            suppressed: false,
            kind: OutcomeKind::Protocol,
        }
    }

    pub fn transport(target: &Target, reason: &str) -> Self {
        Self {
            target: target.clone(),
            status_code: None,
            succeeded: false,
            message: status_line(target, format_args!("URL Error: {}", reason)),
            suppressed: false,
            kind: OutcomeKind::Transport,
        }
    }

    pub fn suppressed(target: &Target) -> Self {
        Self {
            target: target.clone(),
            status_code: None,
            succeeded: false,
            message: String::new(),
            suppressed: true,
            kind: OutcomeKind::Suppressed,
        }
    }

    pub fn unexpected(target: &Target, description: impl std::fmt::Display) -> Self {
        Self {
            target: target.clone(),
            status_code: None,
            succeeded: false,
            message: status_line(target, format_args!("Unexpected Error: {}", description)),
            suppressed: false,
            kind: OutcomeKind::Unexpected,
        }
    }

    /// Succeeded with exactly 200. The only outcome the report counts as healthy.
    pub fn is_healthy(&self) -> bool {
        self.succeeded && self.status_code == Some(200)
    }
}
