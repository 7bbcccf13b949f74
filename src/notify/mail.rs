//! `mail(1)` transport.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::NotifyConfig;
use crate::notify::{Notifier, NotifyError};
use crate::report::Report;

/// Runs `<program> -s <subject> <recipients...>` with the report on stdin.
#[derive(Debug, Clone)]
pub struct MailNotifier {
    program: String,
    subject: String,
    recipients: Vec<String>,
}

impl MailNotifier {
    pub fn new(program: impl Into<String>, subject: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            program: program.into(),
            subject: subject.into(),
            recipients,
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(config.program.clone(), config.subject.clone(), config.recipients.clone())
    }

    fn spawn_error(&self, source: std::io::Error) -> NotifyError {
        NotifyError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Notifier for MailNotifier {
    async fn notify(&self, _report: &Report, body: &str) -> Result<(), NotifyError> {
        if self.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let mut child = Command::new(&self.program)
            .arg("-s")
            .arg(&self.subject)
            .args(&self.recipients)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(body.as_bytes()).await {
                Ok(()) => {}
                // Transport exited without reading; its exit status decides.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(self.spawn_error(e)),
            }
            // Close stdin so the transport sees end of message.
            drop(stdin);
        }

        let status = child.wait().await.map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(NotifyError::Exit {
                program: self.program.clone(),
                status,
            });
        }

        tracing::info!(program = %self.program, recipients = self.recipients.len(), "Notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            timestamp: String::new(),
            healthy_lines: vec![],
            error_lines: vec!["bad".into()],
            has_errors: true,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let notifier = MailNotifier::new("mail", "subject", vec![]);
        let err = notifier.notify(&report(), "body").await.unwrap_err();
        assert!(matches!(err, NotifyError::NoRecipients));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let notifier = MailNotifier::new("/nonexistent/mail", "subject", vec!["ops@example.com".into()]);
        let err = notifier.notify(&report(), "body").await.unwrap_err();
        assert!(matches!(err, NotifyError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transport_exit_status() {
        // `true` and `false` ignore their arguments and stdin.
        let ok = MailNotifier::new("true", "subject", vec!["ops@example.com".into()]);
        assert!(ok.notify(&report(), "body").await.is_ok());

        let failing = MailNotifier::new("false", "subject", vec!["ops@example.com".into()]);
        let err = failing.notify(&report(), "body").await.unwrap_err();
        assert!(matches!(err, NotifyError::Exit { .. }));
    }
}
