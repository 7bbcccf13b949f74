//! Retry logic.
//!
//! # Responsibilities
//! - Run up to `max_attempts` probes for one target, strictly in sequence
//! - Stop at the first healthy (200) attempt without further delay
//! - Sleep a fixed delay between attempts, never after the last
//! - Reduce the attempt set to one outcome via `consensus`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RetryConfig;
use crate::probe::{Outcome, Probe, Target};
use crate::resilience::consensus::consensus;

/// Bounded fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// A single attempt per target.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }

    /// Attempt count actually used; a zero policy still probes once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Probes a target repeatedly and resolves the attempts to one outcome.
#[derive(Debug, Clone)]
pub struct RetryResolver<P> {
    probe: P,
    policy: RetryPolicy,
}

impl<P: Probe> RetryResolver<P> {
    pub fn new(probe: P, policy: RetryPolicy) -> Self {
        Self { probe, policy }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Exactly one outcome for `target`.
    pub async fn resolve(&self, target: &Target) -> Outcome {
        let max_attempts = self.policy.attempts();
        let mut attempts = Vec::with_capacity(max_attempts as usize);

        for attempt in 1..=max_attempts {
            let outcome = self.probe.check(target).await;
            tracing::debug!(
                url = %target,
                attempt,
                max_attempts,
                status = ?outcome.status_code,
                kind = ?outcome.kind,
                "Probe attempt finished"
            );

            if outcome.is_healthy() {
                return outcome;
            }
            attempts.push(outcome);

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        consensus(attempts, max_attempts)
            .unwrap_or_else(|| Outcome::unexpected(target, "no probe attempts were made"))
    }
}
