//! Task pool on the shared runtime.
//!
//! Every target gets its own task; a semaphore caps how many resolver
//! sequences are in flight at once.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::probe::{Outcome, Probe, Target};
use crate::resilience::RetryResolver;

/// Resolve every target with at most `width` in flight, streaming
/// `(index, outcome)` pairs in completion order.
pub async fn run<P: Probe>(
    resolver: Arc<RetryResolver<P>>,
    targets: &[Target],
    width: usize,
    results: mpsc::UnboundedSender<(usize, Outcome)>,
) {
    let permits = Arc::new(Semaphore::new(width.max(1)));
    let mut tasks = JoinSet::new();

    for (index, target) in targets.iter().cloned().enumerate() {
        let resolver = Arc::clone(&resolver);
        let permits = Arc::clone(&permits);
        let results = results.clone();
        tasks.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let outcome = resolver.resolve(&target).await;
                let _ = results.send((index, outcome));
            }
            .in_current_span(),
        );
    }
    drop(results);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Probe task failed");
        }
    }
}
