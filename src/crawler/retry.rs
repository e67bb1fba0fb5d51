//! Bounded retry around a fallible async operation

use std::future::Future;
use std::time::Duration;

/// What to do after an attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Permanent failure; give up now
    Stop,
    /// Transient failure; wait `retry_delay × attempt`
    Backoff,
    /// The site pushed back; wait `block_cooldown × attempt`
    Cooldown,
}

/// Errors that know whether they are worth retrying
pub trait Retryable {
    fn retry_decision(&self) -> RetryDecision;
}

/// How many times to retry and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub block_cooldown: Duration,
}

impl RetryPolicy {
    /// The wait before retry number `attempt` (1-based), or `None` to give up
    pub fn wait_before(&self, decision: RetryDecision, attempt: u32) -> Option<Duration> {
        if attempt > self.max_retries {
            return None;
        }
        match decision {
            RetryDecision::Stop => None,
            RetryDecision::Backoff => Some(self.retry_delay * attempt),
            RetryDecision::Cooldown => Some(self.block_cooldown * attempt),
        }
    }
}

/// Runs `op` until it succeeds, fails permanently, or retries run out
///
/// `op` receives the zero-based attempt number. The last error is returned
/// when the operation does not succeed.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        let error = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        attempt += 1;
        let Some(wait) = policy.wait_before(error.retry_decision(), attempt) else {
            return Err(error);
        };

        tracing::warn!(
            "{} (retry {}/{} in {:?})",
            error,
            attempt,
            policy.max_retries,
            wait
        );
        tokio::time::sleep(wait).await;
    }
}
