//! Retry with exponential backoff.
//!
//! A single implementation shared by every call site that talks to the remote
//! data service. Callers decide which errors are worth retrying.

use crate::{KanbanError, KanbanResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound for the exponential part of the delay.
    pub max_delay: Duration,
    /// Random extra delay in `[0, jitter]` added to every wait.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Exponential part of the wait before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.backoff(attempt) + jitter
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects, or
/// the policy runs out of retries. The last error is returned.
pub async fn retry_with_backoff<T, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> KanbanResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = KanbanResult<T>>,
    P: Fn(&KanbanError) -> bool,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && is_retryable(&e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable failure: {}",
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
