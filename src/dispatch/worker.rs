//! Worker side of process mode.
//!
//! # Protocol
//! ```text
//! parent → worker   one WorkerConfig line, then one Job line per target
//! worker → parent   one Done line per Job, in job order
//! ```
//! Every message is a single line of JSON. The worker exits when its input
//! closes.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::MonitorConfig;
use crate::probe::{HttpProbe, Outcome, Probe, ProbeError, ProbeSettings, Target};
use crate::resilience::{RetryPolicy, RetryResolver};

/// Error inside a worker conversation, on either side.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker pipe failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed worker message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("worker closed its output before answering job {index}")]
    Exited { index: usize },
}

/// Everything a worker needs to rebuild the parent's resolver.
///
/// Sent over stdin so credentials never appear on a command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub settings: ProbeSettings,
    pub policy: RetryPolicy,
}

impl WorkerConfig {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            settings: ProbeSettings::from_config(config),
            policy: RetryPolicy::from_config(&config.retry),
        }
    }
}

/// One target to resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub index: usize,
    pub target: Target,
}

/// The resolved outcome for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Done {
    pub index: usize,
    pub outcome: Outcome,
}

/// Serve jobs with the production HTTP probe.
pub async fn serve<R, W>(reader: R, writer: W) -> Result<usize, WorkerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with(reader, writer, |config| HttpProbe::new(config.settings.clone())).await
}

/// Serve jobs with a probe built from the received config. Returns the
/// number of jobs answered.
pub async fn serve_with<R, W, P, F>(reader: R, mut writer: W, build: F) -> Result<usize, WorkerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    P: Probe,
    F: FnOnce(&WorkerConfig) -> Result<P, ProbeError>,
{
    let mut lines = BufReader::new(reader).lines();
    let Some(header) = lines.next_line().await? else {
        return Ok(0);
    };
    let config: WorkerConfig = serde_json::from_str(&header)?;
    let resolver = RetryResolver::new(build(&config)?, config.policy);
    tracing::debug!(pid = std::process::id(), "Worker ready");

    let mut answered = 0usize;
    while let Some(line) = lines.next_line().await? {
        let job: Job = serde_json::from_str(&line)?;
        let outcome = AssertUnwindSafe(resolver.resolve(&job.target))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Outcome::unexpected(&job.target, "probe worker panicked"));

        let done = Done {
            index: job.index,
            outcome,
        };
        write_line(&mut writer, &serde_json::to_string(&done)?).await?;
        answered += 1;
    }
    Ok(answered)
}

pub(crate) async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::duplex;

    use crate::probe::scripted::{ScriptedProbe, Step};

    fn header() -> String {
        let config = WorkerConfig {
            settings: ProbeSettings::default(),
            policy: RetryPolicy::new(3, Duration::ZERO),
        };
        serde_json::to_string(&config).unwrap()
    }

    fn job(index: usize, name: &str) -> String {
        serde_json::to_string(&Job {
            index,
            target: Target::new(name),
        })
        .unwrap()
    }

    async fn converse(probe: ScriptedProbe, input: Vec<String>) -> (Result<usize, WorkerError>, Vec<Done>) {
        let (mut to_worker, worker_in) = duplex(64 * 1024);
        let (worker_out, from_worker) = duplex(64 * 1024);

        for line in &input {
            write_line(&mut to_worker, line).await.unwrap();
        }
        drop(to_worker);

        let served = serve_with(worker_in, worker_out, |_| Ok(probe)).await;
        let mut lines = BufReader::new(from_worker).lines();
        let mut replies = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            replies.push(serde_json::from_str(&line).unwrap());
        }
        (served, replies)
    }

    #[tokio::test]
    async fn test_answers_every_job_in_order() {
        let probe = ScriptedProbe::new()
            .script("down.example.com", &[Step::Transport])
            .script("flaky.example.com", &[Step::Status(500), Step::Status(200)]);
        let input = vec![
            header(),
            job(4, "ok.example.com"),
            job(7, "down.example.com"),
            job(9, "flaky.example.com"),
        ];
        let (served, replies) = converse(probe.clone(), input).await;

        assert_eq!(served.unwrap(), 3);
        let indices: Vec<usize> = replies.iter().map(|d| d.index).collect();
        assert_eq!(indices, [4, 7, 9]);
        assert!(replies[0].outcome.is_healthy());
        assert!(replies[1].outcome.message.contains("URL Error"));
        assert!(replies[2].outcome.is_healthy());
        assert_eq!(probe.calls("down.example.com"), 3);
    }

    #[tokio::test]
    async fn test_panic_becomes_unexpected_outcome() {
        let probe = ScriptedProbe::new().script("panic.example.com", &[Step::Panic]);
        let input = vec![header(), job(0, "panic.example.com"), job(1, "ok.example.com")];
        let (served, replies) = converse(probe, input).await;

        assert_eq!(served.unwrap(), 2);
        assert!(replies[0].outcome.message.contains("Unexpected Error: probe worker panicked"));
        assert!(replies[1].outcome.is_healthy());
    }

    #[tokio::test]
    async fn test_closed_input_before_header() {
        let (served, replies) = converse(ScriptedProbe::new(), vec![]).await;
        assert_eq!(served.unwrap(), 0);
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_job_is_an_error() {
        let input = vec![header(), "not json".to_string()];
        let (served, replies) = converse(ScriptedProbe::new(), input).await;
        assert!(matches!(served, Err(WorkerError::Codec(_))));
        assert!(replies.is_empty());
    }

    #[test]
    fn test_config_carries_credentials_and_policy() {
        let mut config = MonitorConfig::default();
        config.retry.max_attempts = 5;
        config.credentials.push(crate::config::CredentialRule {
            patterns: vec!["swp".into()],
            realm: None,
            username: "gpcr".into(),
            password: "xtal".into(),
        });

        let encoded = serde_json::to_string(&WorkerConfig::from_config(&config)).unwrap();
        let decoded: WorkerConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.policy.max_attempts, 5);
        assert_eq!(decoded.settings.credentials, config.credentials);
        assert_eq!(decoded.settings.timeout, Duration::from_secs(10));
    }
}
