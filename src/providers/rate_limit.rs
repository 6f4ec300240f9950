//! Rolling-window rate limiter for agent calls.
//!
//! [`RateLimiter`] admits at most `requests_per_minute` calls in any rolling
//! 60-second window. [`admit()`](RateLimiter::admit) prunes the call log,
//! checks it and reserves a slot in one critical section, then tells the
//! caller how long to sleep. The sleep happens outside the lock; the slot is
//! logged at the instant the wait ends, so concurrent callers queue behind
//! each other instead of all claiming the same free slot.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::{JobscoutError, Result};

/// Length of the rolling window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Configuration for the agent rate limiter.
///
/// ```rust
/// # use jobscout::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .requests_per_minute(2)
///     .max_wait(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether admission checks run at all. Default: true.
    pub enabled: bool,
    /// Calls allowed per rolling 60 s window. Default: 2.
    pub requests_per_minute: u32,
    /// Longest wait the limiter will ask a caller to sit through. Default: 30s.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 2,
            max_wait: Duration::from_secs(30),
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that admits every call immediately.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable admission checks.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the number of calls allowed per rolling minute.
    pub fn requests_per_minute(mut self, n: u32) -> Self {
        self.requests_per_minute = n;
        self
    }

    /// Set the longest acceptable admission wait.
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }
}

/// Rolling-window limiter shared by all invocations of a gateway.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Reserve a call slot and return how long to wait before using it.
    ///
    /// Returns `Duration::ZERO` when a slot is free now. Otherwise returns
    /// the time until the slot frees up and logs the call at that future
    /// instant, or fails with `RateLimitExceeded` (logging nothing) when the
    /// wait would be longer than `max_wait`.
    pub fn admit(&self) -> Result<Duration> {
        if !self.config.enabled {
            return Ok(Duration::ZERO);
        }

        let limit = self.config.requests_per_minute as usize;
        if limit == 0 {
            // nothing will ever free a slot
            return Err(JobscoutError::RateLimitExceeded {
                limit: 0,
                wait: WINDOW,
            });
        }

        let now = Instant::now();
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);

        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) > WINDOW {
                calls.pop_front();
            } else {
                break;
            }
        }

        let wait = if calls.len() < limit {
            Duration::ZERO
        } else {
            // the slot frees when the L-th most recent start leaves the window
            let blocking = calls[calls.len() - limit];
            (blocking + WINDOW).saturating_duration_since(now)
        };
        if wait > self.config.max_wait {
            return Err(JobscoutError::RateLimitExceeded {
                limit: self.config.requests_per_minute,
                wait,
            });
        }

        calls.push_back(now + wait);
        Ok(wait)
    }

    /// Number of call starts currently logged, reservations included.
    pub fn logged_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rpm: u32, max_wait_secs: u64) -> RateLimiter {
        RateLimiter::new(
            RateLimitConfig::new()
                .requests_per_minute(rpm)
                .max_wait(Duration::from_secs(max_wait_secs)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_limit_immediately() {
        let limiter = limiter(2, 30);
        for _ in 0..2 {
            assert_eq!(limiter.admit().unwrap(), Duration::ZERO);
        }
        assert_eq!(limiter.logged_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_when_wait_exceeds_max() {
        let limiter = limiter(2, 30);
        limiter.admit().unwrap();
        limiter.admit().unwrap();

        let err = limiter.admit().unwrap_err();
        match err {
            JobscoutError::RateLimitExceeded { limit, wait } => {
                assert_eq!(limit, 2);
                assert_eq!(wait, WINDOW);
            }
            other => panic!("unexpected error: {other}"),
        }
        // refusal logs nothing
        assert_eq!(limiter.logged_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_wait_when_within_max() {
        let limiter = limiter(2, 30);
        limiter.admit().unwrap();
        limiter.admit().unwrap();

        tokio::time::advance(Duration::from_secs(35)).await;
        assert_eq!(limiter.admit().unwrap(), Duration::from_secs(25));
        assert_eq!(limiter.logged_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_equal_to_max_is_allowed() {
        let limiter = limiter(1, 30);
        limiter.admit().unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(limiter.admit().unwrap(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn reservation_blocks_the_next_caller() {
        let limiter = limiter(1, 30);
        assert_eq!(limiter.admit().unwrap(), Duration::ZERO);

        tokio::time::advance(Duration::from_secs(35)).await;
        // slot reserved 25s from now
        assert_eq!(limiter.admit().unwrap(), Duration::from_secs(25));
        assert!(matches!(
            limiter.admit(),
            Err(JobscoutError::RateLimitExceeded { limit: 1, wait }) if wait == Duration::from_secs(85)
        ));

        // the first call has left the window but the reservation still holds the slot
        tokio::time::advance(Duration::from_secs(26)).await;
        assert!(matches!(
            limiter.admit(),
            Err(JobscoutError::RateLimitExceeded { wait, .. }) if wait == Duration::from_secs(59)
        ));
        assert_eq!(limiter.logged_calls(), 1);
    }

    #[test]
    fn concurrent_admissions_never_exceed_limit() {
        let limiter = std::sync::Arc::new(limiter(3, 0));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.admit().is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 3);
        assert_eq!(limiter.logged_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn old_calls_are_pruned() {
        let limiter = limiter(1, 0);
        limiter.admit().unwrap();

        tokio::time::advance(WINDOW + Duration::from_millis(1)).await;
        assert_eq!(limiter.admit().unwrap(), Duration::ZERO);
        // the pruned call is gone, the new one is logged
        assert_eq!(limiter.logged_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_is_a_no_op() {
        let limiter = RateLimiter::new(RateLimitConfig::disabled().requests_per_minute(0));
        for _ in 0..10 {
            assert_eq!(limiter.admit().unwrap(), Duration::ZERO);
        }
        assert_eq!(limiter.logged_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_limit_always_refuses() {
        let limiter = limiter(0, 3600);
        assert!(matches!(
            limiter.admit(),
            Err(JobscoutError::RateLimitExceeded { limit: 0, .. })
        ));
        assert_eq!(limiter.logged_calls(), 0);
    }
}
