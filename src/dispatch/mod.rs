//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! targets
//!     → pool.rs (tasks on the shared runtime, semaphore-bounded)
//!       or process.rs (worker processes fed one job at a time)
//!     → (index, Outcome) channel, completion order
//!     → reconcile: exactly one Outcome per target
//! ```
//!
//! # Design Decisions
//! - Both strategies produce the same logical result for the same settings
//! - One target's failure never cancels or blocks another
//! - Outcomes are kept in arrival order; nothing downstream depends on it

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{ConcurrencyConfig, ConcurrencyMode};
use crate::probe::{Outcome, Probe, Target};
use crate::resilience::RetryResolver;

pub mod pool;
pub mod process;
pub mod worker;

pub use process::{ProcessPool, WorkerCommand};
pub use worker::WorkerConfig;

/// A dispatch strategy could not be started.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("process mode requested but no worker command is configured")]
    NoWorkers,

    #[error("failed to spawn worker {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode worker config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Fans a resolver out over every target.
#[derive(Debug)]
pub struct Dispatcher<P> {
    resolver: Arc<RetryResolver<P>>,
    concurrency: ConcurrencyConfig,
    workers: Option<ProcessPool>,
}

impl<P: Probe> Dispatcher<P> {
    pub fn new(resolver: RetryResolver<P>, concurrency: ConcurrencyConfig) -> Self {
        Self {
            resolver: Arc::new(resolver),
            concurrency,
            workers: None,
        }
    }

    /// Enable process mode. Workers rebuild their own probe from the pool's
    /// settings, so these should describe the same checks as the resolver.
    pub fn with_process_pool(mut self, pool: ProcessPool) -> Self {
        self.workers = Some(pool);
        self
    }

    pub fn resolver(&self) -> &RetryResolver<P> {
        &self.resolver
    }

    /// Resolve all targets with the configured mode.
    pub async fn dispatch(&self, targets: &[Target]) -> Result<Vec<Outcome>, DispatchError> {
        self.dispatch_all(targets, self.concurrency.mode).await
    }

    /// Resolve all targets with an explicit mode. Returns one outcome per
    /// target, in completion order.
    pub async fn dispatch_all(
        &self,
        targets: &[Target],
        mode: ConcurrencyMode,
    ) -> Result<Vec<Outcome>, DispatchError> {
        let config = ConcurrencyConfig {
            mode,
            ..self.concurrency.clone()
        };
        let width = config.width();
        tracing::info!(targets = targets.len(), mode = ?mode, width, "Dispatching probes");

        let (tx, rx) = mpsc::unbounded_channel();
        let (run, received) = match mode {
            ConcurrencyMode::Thread => {
                let resolver = Arc::clone(&self.resolver);
                let (_, received) = tokio::join!(pool::run(resolver, targets, width, tx), collect(rx));
                (Ok(()), received)
            }
            ConcurrencyMode::Process => {
                let Some(workers) = &self.workers else {
                    return Err(DispatchError::NoWorkers);
                };
                tokio::join!(process::run(workers, targets, width, tx), collect(rx))
            }
        };
        run?;

        Ok(reconcile(targets, received))
    }
}

async fn collect(mut rx: mpsc::UnboundedReceiver<(usize, Outcome)>) -> Vec<(usize, Outcome)> {
    let mut received = Vec::new();
    while let Some((index, outcome)) = rx.recv().await {
        log_outcome(&outcome);
        received.push((index, outcome));
    }
    received
}

fn log_outcome(outcome: &Outcome) {
    if outcome.suppressed {
        tracing::debug!(url = %outcome.target, "Suppressed failure");
    } else if outcome.is_healthy() {
        tracing::info!(url = %outcome.target, status = ?outcome.status_code, "Target healthy");
    } else {
        tracing::warn!(url = %outcome.target, status = ?outcome.status_code, message = %outcome.message, "Target unhealthy");
    }
}

/// Keep the first outcome per target in arrival order, then fill any target
/// that produced none with an Unexpected outcome.
fn reconcile(targets: &[Target], received: Vec<(usize, Outcome)>) -> Vec<Outcome> {
    let mut seen = vec![false; targets.len()];
    let mut outcomes = Vec::with_capacity(targets.len());

    for (index, outcome) in received {
        match seen.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                outcomes.push(outcome);
            }
            _ => tracing::warn!(index, "Discarding duplicate or unknown outcome"),
        }
    }

    for (target, _) in targets.iter().zip(&seen).filter(|(_, seen)| !**seen) {
        tracing::error!(url = %target, "No outcome collected");
        outcomes.push(Outcome::unexpected(target, "probe task failed before producing a result"));
    }

    outcomes
}
