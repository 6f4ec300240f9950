//! Retry configuration, delay calculation, and the shared retry loop.
//!
//! Only failures the [`AgentCaller`](super::AgentCaller) marks as retryable
//! are retried; anything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::InvocationKey;
use crate::telemetry::{Counter, InvocationMetrics};
use crate::{AgentError, JobscoutError, Result};

/// Configuration for retry behaviour on retryable agent failures.
///
/// Uses exponential backoff: 1s, 2s, 4s, ... capped at `max_delay`.
///
/// ```rust
/// # use jobscout::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(4)
///     .initial_delay(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 4.
    pub max_attempts: u32,
    /// Delay before the first retry. Default: 1s.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request). Clamped to at least 1.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    ///
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Run an agent call with retry and backoff.
///
/// Counts `model_calls` before every attempt and `errors` after every failed
/// one. A retryable failure with attempts left counts `retries` and sleeps
/// the backoff delay; a non-retryable failure returns at once. When the
/// budget runs out the last failure is returned.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    metrics: &InvocationMetrics,
    key: &InvocationKey,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, AgentError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..max_attempts {
        metrics.increment(Counter::ModelCalls);
        info!(key = %key, attempt = attempt + 1, "calling agent");
        match f().await {
            Ok(result) => {
                info!(key = %key, attempt = attempt + 1, "agent call succeeded");
                return Ok(result);
            }
            Err(e) => {
                metrics.increment(Counter::Errors);
                error!(key = %key, attempt = attempt + 1, error = %e, "agent call failed");
                if !e.is_retryable() {
                    return Err(e.into());
                }
                if attempt + 1 < max_attempts {
                    metrics.increment(Counter::Retries);
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        key = %key,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "quota error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
        }
    }
    error!(key = %key, max_attempts, "all attempts failed");
    Err(last_err.map(JobscoutError::from).unwrap_or(JobscoutError::NoAgent))
}
