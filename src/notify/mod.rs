//! Notification subsystem.
//!
//! # Responsibilities
//! - Hand a finished report to an external mail transport
//! - Only invoked when the run has errors or a send is forced
//!
//! # Design Decisions
//! - Notification failures are reported, never fatal to the run
//! - Transport is a command that reads the message on stdin

use std::future::Future;

use crate::report::Report;

pub mod mail;

pub use mail::MailNotifier;

/// Error delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no recipients configured")]
    NoRecipients,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Delivers a report to people.
pub trait Notifier: Send + Sync {
    fn notify(&self, report: &Report, body: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier that never sends anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _report: &Report, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
