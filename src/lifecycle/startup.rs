//! Startup: turn a validated config into a ready monitor.

use crate::config::{ConcurrencyMode, MonitorConfig};
use crate::dispatch::{ProcessPool, WorkerCommand};
use crate::lifecycle::run::Monitor;
use crate::notify::MailNotifier;
use crate::probe::{HttpProbe, ProbeError, ProbeSettings};

/// The monitor could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("cannot locate own executable for worker processes: {0}")]
    WorkerCommand(#[source] std::io::Error),
}

/// Production wiring: reqwest probe, file target list and report, `mail`
/// notifier, and this executable as the process-mode worker.
pub fn build_monitor(config: &MonitorConfig, force_notify: bool) -> Result<Monitor<HttpProbe, MailNotifier>, StartupError> {
    let probe = HttpProbe::new(ProbeSettings::from_config(config))?;
    let notifier = MailNotifier::from_config(&config.notify);

    tracing::info!(
        targets = %config.targets.path.display(),
        report = %config.report.path.display(),
        mode = ?config.concurrency.mode,
        width = config.concurrency.width(),
        max_attempts = config.retry.max_attempts,
        delay_ms = config.retry.delay_ms,
        credential_rules = config.credentials.len(),
        suppress_patterns = config.suppress.len(),
        "Configuration loaded"
    );

    let monitor = Monitor::from_config(config, probe, notifier, force_notify);
    if config.concurrency.mode != ConcurrencyMode::Process {
        return Ok(monitor);
    }
    let command = WorkerCommand::current_exe(&config.observability.log_level).map_err(StartupError::WorkerCommand)?;
    Ok(monitor.with_process_pool(ProcessPool::from_config(command, config)))
}
