//! Aggregation of resolved outcomes into a report.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::probe::outcome::TARGET_COLUMN_WIDTH;
use crate::probe::Outcome;

/// `Wednesday, 14. October 2026 09:05AM`
pub const TIMESTAMP_FORMAT: &str = "%A, %d. %B %Y %I:%M%p";

/// Line between unhealthy and healthy sections in verbose reports.
pub const SEPARATOR_WIDTH: usize = 70;

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub healthy_lines: Vec<String>,
    pub error_lines: Vec<String>,
    pub has_errors: bool,
    /// Whether healthy lines are rendered into the body.
    pub verbose: bool,
}

impl Report {
    /// Rendered report, one entry per line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3 + self.error_lines.len() + self.healthy_lines.len());
        lines.push(format!("Timestamp: {}", self.timestamp));
        lines.push(format!("{:<width$}Status Code", "Website", width = TARGET_COLUMN_WIDTH));
        lines.extend(self.error_lines.iter().cloned());
        if self.verbose {
            lines.push("=".repeat(SEPARATOR_WIDTH));
            lines.extend(self.healthy_lines.iter().cloned());
        }
        lines
    }

    /// Text body with a trailing newline.
    pub fn body(&self) -> String {
        let mut body = self.lines().join("\n");
        body.push('\n');
        body
    }
}

/// Aggregate with the current local time.
pub fn aggregate(outcomes: &[Outcome], verbose: bool) -> Report {
    aggregate_at(outcomes, verbose, &Local::now())
}

/// Pure aggregation: suppressed outcomes are dropped, the rest split into
/// healthy (200) and unhealthy, both kept in collection order.
pub fn aggregate_at<Tz>(outcomes: &[Outcome], verbose: bool, generated_at: &DateTime<Tz>) -> Report
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (healthy, unhealthy): (Vec<&Outcome>, Vec<&Outcome>) = outcomes
        .iter()
        .filter(|o| !o.suppressed)
        .partition(|o| o.is_healthy());

    let error_lines: Vec<String> = unhealthy.iter().map(|o| o.message.clone()).collect();
    Report {
        timestamp: generated_at.format(TIMESTAMP_FORMAT).to_string(),
        healthy_lines: healthy.iter().map(|o| o.message.clone()).collect(),
        has_errors: !error_lines.is_empty(),
        error_lines,
        verbose,
    }
}
