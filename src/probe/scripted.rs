//! In-memory probe for tests, available with the `test-util` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::probe::{Outcome, Probe, Target};

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Status(u16),
    Transport,
    Suppressed,
    Panic,
}

#[derive(Debug, Default)]
struct Inner {
    scripts: Mutex<HashMap<String, Vec<Step>>>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    latency: Duration,
}

/// Replays a per-target script; the last step repeats once exhausted.
/// Unscripted targets answer 200. Clones share the script and counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    inner: Arc<Inner>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                latency,
                ..Default::default()
            }),
        }
    }

    pub fn script(self, target: &str, steps: &[Step]) -> Self {
        let url = Target::new(target).url().to_string();
        lock(&self.inner.scripts).insert(url, steps.to_vec());
        self
    }

    pub fn calls(&self, target: &str) -> usize {
        let url = Target::new(target).url().to_string();
        lock(&self.inner.calls).get(&url).copied().unwrap_or(0)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }
}

impl Probe for ScriptedProbe {
    async fn check(&self, target: &Target) -> Outcome {
        let index = {
            let mut calls = lock(&self.inner.calls);
            let count = calls.entry(target.url().to_string()).or_default();
            *count += 1;
            *count - 1
        };
        let step = lock(&self.inner.scripts)
            .get(target.url())
            .and_then(|steps| steps.get(index).or(steps.last()).copied())
            .unwrap_or(Step::Status(200));

        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Step::Status(code) => crate::probe::http::classify_status(target, code),
            Step::Transport => Outcome::transport(target, "connection refused"),
            Step::Suppressed => Outcome::suppressed(target),
            Step::Panic => panic!("scripted probe panic for {}", target),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
