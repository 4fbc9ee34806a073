//! Retry with exponential backoff for rate-limited requests
//!
//! Only [`Error::RateLimited`] is retried. A zero quota is reported at once
//! since waiting cannot change it.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each further one
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(5),
        }
    }
}

/// A scheduled wait, scoped to one `execute` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based number of the retry about to happen
    pub attempt: u32,
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_secs(config.initial_delay_secs))
    }

    /// A policy that never waits
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Wait after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Execute an async operation with retry.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with(|_, _| {}, operation).await
    }

    /// Like [`execute`](Self::execute), calling `on_wait` before each sleep.
    pub async fn execute_with<F, Fut, T, W>(&self, mut on_wait: W, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        W: FnMut(&RetryState, &Error),
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_quota_exhausted() => {
                    warn!(error = %e, "Quota exhausted; not retrying");
                    return Err(e);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let state = RetryState {
                        attempt: attempt + 1,
                        max_retries: self.max_retries,
                        delay: self.delay_for(attempt),
                    };

                    warn!(
                        attempt = state.attempt,
                        max_retries = self.max_retries,
                        delay_secs = state.delay.as_secs_f64(),
                        error = %e,
                        "Retrying after rate limit"
                    );

                    on_wait(&state, &e);
                    tokio::time::sleep(state.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
