//! Bounded, linearly backed-off retries for pushes
//!
//! Every push failure is treated as retryable: the policy does not look at
//! why git failed (network, rejection, auth).

use std::time::Duration;

use backoff::backoff::Backoff;

use crate::{Error, Result};

/// Attempt limit and backoff unit.
///
/// Attempt `n` (1-based) that fails is followed by a wait of `n * unit`,
/// except after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, unit: Duration) -> Self {
        Self { max_attempts, unit }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `on_retry` is called with the failure and the upcoming wait before
    /// each sleep. On exhaustion the last failure is wrapped in
    /// [`Error::PushExhausted`].
    pub fn run<T, F, N>(&self, mut op: F, mut on_retry: N) -> Result<T>
    where
        F: FnMut() -> Result<T>,
        N: FnMut(&Error, Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut made = 0u32;

        let outcome = backoff::retry_notify(
            LinearBackoff::new(attempts, self.unit),
            || {
                made += 1;
                op().map_err(backoff::Error::transient)
            },
            |err: Error, wait: Duration| {
                tracing::warn!(error = %err, wait_ms = wait.as_millis() as u64, "Retrying after failure");
                on_retry(&err, wait);
            },
        );

        outcome.map_err(|e| {
            let last = match e {
                backoff::Error::Permanent(err) => err,
                backoff::Error::Transient { err, .. } => err,
            };
            Error::PushExhausted {
                attempts: made,
                source: Box::new(last),
            }
        })
    }
}

/// Waits `unit`, `2 * unit`, ... and gives up after `max_attempts` failures.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    max_attempts: u32,
    unit: Duration,
    failures: u32,
}

impl LinearBackoff {
    pub fn new(max_attempts: u32, unit: Duration) -> Self {
        Self {
            max_attempts,
            unit,
            failures: 0,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.failures = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.max_attempts {
            None
        } else {
            Some(self.unit * self.failures)
        }
    }
}
