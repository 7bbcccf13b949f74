//! One complete monitoring run.

use std::time::{Duration, Instant};

use tracing::Instrument;
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::dispatch::{DispatchError, Dispatcher, ProcessPool};
use crate::notify::Notifier;
use crate::probe::Probe;
use crate::report::{aggregate, FileSink, Report, ReportError, ReportSink};
use crate::resilience::{RetryPolicy, RetryResolver};
use crate::targets::{FileTargets, TargetSource, TargetsError};

/// A fatal condition that aborted the run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Targets(#[from] TargetsError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Include healthy targets in the report.
    pub verbose: bool,
    /// Notify even when every target is healthy.
    pub force_notify: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: Report,
    /// Text rendering of the report.
    pub body: String,
    pub targets: usize,
    pub notified: bool,
    pub elapsed: Duration,
}

/// Wires the engine to its collaborators.
pub struct Monitor<P, N> {
    dispatcher: Dispatcher<P>,
    targets: Box<dyn TargetSource>,
    sink: Box<dyn ReportSink>,
    notifier: N,
    options: RunOptions,
}

impl<P: Probe, N: Notifier> Monitor<P, N> {
    pub fn new(
        dispatcher: Dispatcher<P>,
        targets: Box<dyn TargetSource>,
        sink: Box<dyn ReportSink>,
        notifier: N,
        options: RunOptions,
    ) -> Self {
        Self {
            dispatcher,
            targets,
            sink,
            notifier,
            options,
        }
    }

    /// File-backed target list and report, as configured.
    pub fn from_config(config: &MonitorConfig, probe: P, notifier: N, force_notify: bool) -> Self {
        let resolver = RetryResolver::new(probe, RetryPolicy::from_config(&config.retry));
        let dispatcher = Dispatcher::new(resolver, config.concurrency.clone());
        let verbose = config.report.verbose;
        Self::new(
            dispatcher,
            Box::new(FileTargets::new(config.targets.path.clone())),
            Box::new(FileSink::from_config(&config.report)),
            notifier,
            RunOptions { verbose, force_notify },
        )
    }

    /// Run process-mode dispatches through `pool`.
    pub fn with_process_pool(mut self, pool: ProcessPool) -> Self {
        self.dispatcher = self.dispatcher.with_process_pool(pool);
        self
    }

    /// Load, probe, aggregate, write once, then notify if warranted.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let targets = self.targets.load()?;
        tracing::info!(targets = targets.len(), "Run started");

        let outcomes = self.dispatcher.dispatch(&targets).await?;
        let report = aggregate(&outcomes, self.options.verbose);
        let body = report.body();
        self.sink.write(&report)?;

        let notified = if report.has_errors || self.options.force_notify {
            tracing::info!(has_errors = report.has_errors, "Sending notification");
            match self.notifier.notify(&report, &body).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(error = %e, "Notification failed");
                    false
                }
            }
        } else {
            tracing::info!("No errors detected, skipping notification");
            false
        };

        let elapsed = started.elapsed();
        tracing::info!(
            healthy = report.healthy_lines.len(),
            unhealthy = report.error_lines.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Run finished"
        );

        Ok(RunSummary {
            report,
            body,
            targets: targets.len(),
            notified,
            elapsed,
        })
    }
}
