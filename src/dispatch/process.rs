//! Process pool.
//!
//! # Responsibilities
//! - Start up to `width` worker processes, each its own address space with
//!   its own HTTP client
//! - Hand each worker one job at a time from a shared queue
//! - Stream the outcomes back in completion order
//!
//! # Design Decisions
//! - Workers are this executable re-run with `--worker`; see `worker.rs`
//! - A worker that dies or misbehaves loses at most the job it was holding;
//!   reconciliation reports that target as Unexpected
//! - Children are killed if the pool is dropped mid-run

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::MonitorConfig;
use crate::dispatch::worker::{write_line, Done, Job, WorkerConfig, WorkerError};
use crate::dispatch::DispatchError;
use crate::probe::{Outcome, Target};

pub(crate) type Queue = Arc<Mutex<VecDeque<(usize, Target)>>>;

/// How a worker process is started.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The running executable in worker mode.
    pub fn current_exe(log_level: &str) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, ["--worker", "--log-level", log_level]))
    }

    fn spawn(&self) -> Result<Child, DispatchError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }
}

/// Worker command plus the settings every worker is started with.
#[derive(Debug, Clone)]
pub struct ProcessPool {
    command: WorkerCommand,
    config: WorkerConfig,
}

impl ProcessPool {
    pub fn new(command: WorkerCommand, config: WorkerConfig) -> Self {
        Self { command, config }
    }

    pub fn from_config(command: WorkerCommand, config: &MonitorConfig) -> Self {
        Self::new(command, WorkerConfig::from_config(config))
    }
}

/// Resolve every target across at most `width` worker processes.
///
/// All workers are started before any job is sent, so a spawn failure
/// aborts the dispatch before a single probe is made.
pub async fn run(
    pool: &ProcessPool,
    targets: &[Target],
    width: usize,
    results: mpsc::UnboundedSender<(usize, Outcome)>,
) -> Result<(), DispatchError> {
    if targets.is_empty() {
        return Ok(());
    }
    let width = width.max(1).min(targets.len());
    let header = serde_json::to_string(&pool.config)?;
    let queue: Queue = Arc::new(Mutex::new(targets.iter().cloned().enumerate().collect()));

    let children = (0..width)
        .map(|_| pool.command.spawn())
        .collect::<Result<Vec<_>, _>>()?;

    let mut workers = JoinSet::new();
    for (id, mut child) in children.into_iter().enumerate() {
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            tracing::error!(worker = id, "Worker started without pipes");
            continue;
        };
        let header = header.clone();
        let queue = Arc::clone(&queue);
        let results = results.clone();
        workers.spawn(
            async move {
                let pid = child.id();
                match drive(stdout, stdin, &header, &queue, &results).await {
                    Ok(resolved) => tracing::debug!(worker = id, pid, resolved, "Worker drained"),
                    Err(e) => tracing::error!(worker = id, pid, error = %e, "Worker failed"),
                }
                match child.wait().await {
                    Ok(status) if !status.success() => {
                        tracing::warn!(worker = id, pid, %status, "Worker exited abnormally")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(worker = id, pid, error = %e, "Failed to reap worker"),
                }
            }
            .in_current_span(),
        );
    }
    drop(results);

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Worker task failed");
        }
    }
    Ok(())
}

/// Parent half of one worker conversation. Sends the header, then one job
/// at a time until the queue is empty; closing `writer` ends the worker.
pub(crate) async fn drive<R, W>(
    reader: R,
    mut writer: W,
    header: &str,
    queue: &Queue,
    results: &mpsc::UnboundedSender<(usize, Outcome)>,
) -> Result<usize, WorkerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    write_line(&mut writer, header).await?;

    let mut resolved = 0usize;
    while let Some((index, target)) = next_job(queue) {
        write_line(&mut writer, &serde_json::to_string(&Job { index, target })?).await?;
        let Some(line) = lines.next_line().await? else {
            return Err(WorkerError::Exited { index });
        };
        let done: Done = serde_json::from_str(&line)?;
        resolved += 1;
        if results.send((done.index, done.outcome)).is_err() {
            break;
        }
    }
    Ok(resolved)
}

fn next_job(queue: &Queue) -> Option<(usize, Target)> {
    queue.lock().ok().and_then(|mut jobs| jobs.pop_front())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::duplex;

    use crate::dispatch::worker::serve_with;
    use crate::probe::scripted::{ScriptedProbe, Step};
    use crate::probe::ProbeSettings;
    use crate::resilience::RetryPolicy;

    fn config() -> WorkerConfig {
        WorkerConfig {
            settings: ProbeSettings::default(),
            policy: RetryPolicy::new(3, Duration::ZERO),
        }
    }

    fn queue(names: &[&str]) -> Queue {
        Arc::new(Mutex::new(names.iter().map(|n| Target::new(*n)).enumerate().collect()))
    }

    /// Run `width` in-memory workers against one queue.
    async fn drain(probe: &ScriptedProbe, queue: &Queue, width: usize) -> Vec<(usize, Outcome)> {
        let header = serde_json::to_string(&config()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut set = JoinSet::new();

        for _ in 0..width {
            let (parent_out, worker_in) = duplex(64 * 1024);
            let (worker_out, parent_in) = duplex(64 * 1024);
            let probe = probe.clone();
            let header = header.clone();
            let queue = Arc::clone(queue);
            let tx = tx.clone();
            set.spawn(async move {
                let (driven, served) = tokio::join!(
                    drive(parent_in, parent_out, &header, &queue, &tx),
                    serve_with(worker_in, worker_out, |_| Ok(probe)),
                );
                (driven.unwrap(), served.unwrap())
            });
        }
        drop(tx);

        let mut total_driven = 0;
        while let Some(joined) = set.join_next().await {
            let (driven, served) = joined.unwrap();
            assert_eq!(driven, served);
            total_driven += driven;
        }

        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item);
        }
        assert_eq!(received.len(), total_driven);
        received
    }

    #[tokio::test]
    async fn test_workers_share_the_queue() {
        let probe = ScriptedProbe::new()
            .script("down.example.com", &[Step::Transport])
            .script("sick.example.com", &[Step::Status(503)]);
        let names = ["ok.example.com", "down.example.com", "sick.example.com", "a.example.com", "b.example.com"];
        let queue = queue(&names);

        let mut received = drain(&probe, &queue, 2).await;
        received.sort_by_key(|(index, _)| *index);

        let indices: Vec<usize> = received.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4]);
        assert!(received[0].1.is_healthy());
        assert_eq!(received[1].1.status_code, None);
        assert!(received[2].1.message.ends_with("HTTP Error: 503 (after 3 attempts)"));
        assert!(queue.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_job_in_flight_per_worker() {
        let probe = ScriptedProbe::with_latency(Duration::from_millis(20));
        let names: Vec<String> = (0..9).map(|i| format!("site{i}.example.com")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let received = drain(&probe, &queue(&refs), 2).await;
        assert_eq!(received.len(), 9);
        assert!(probe.peak_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_dead_worker_reports_held_job() {
        let header = serde_json::to_string(&config()).unwrap();
        let queue = queue(&["a.example.com", "b.example.com"]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        // A worker that reads nothing and answers nothing.
        let (parent_out, _worker_in) = duplex(64 * 1024);
        let (worker_out, parent_in) = duplex(64 * 1024);
        drop(worker_out);

        let err = drive(parent_in, parent_out, &header, &queue, &tx).await.unwrap_err();
        assert!(matches!(err, WorkerError::Exited { index: 0 }));
        drop(tx);
        assert!(rx.recv().await.is_none());
        assert_eq!(queue.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_failure_aborts() {
        let pool = ProcessPool::new(WorkerCommand::new("/nonexistent/sitewatch", ["--worker"]), config());
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = run(&pool, &[Target::new("ok.example.com")], 2, tx).await.unwrap_err();
        assert!(matches!(err, DispatchError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_target_list_starts_no_workers() {
        let pool = ProcessPool::new(WorkerCommand::new("/nonexistent/sitewatch", ["--worker"]), config());
        let (tx, mut rx) = mpsc::unbounded_channel();
        run(&pool, &[], 2, tx).await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_worker_that_exits_loses_only_its_jobs() {
        // `true` exits immediately without reading or answering.
        let pool = ProcessPool::new(WorkerCommand::new("true", Vec::<String>::new()), config());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let targets = [Target::new("a.example.com"), Target::new("b.example.com")];

        run(&pool, &targets, 2, tx).await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
