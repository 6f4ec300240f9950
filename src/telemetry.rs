//! Invocation counters and metric name constants.
//!
//! [`InvocationMetrics`] is the process-wide source of truth behind
//! `GET /metrics`. Every increment is also forwarded to the `metrics` facade
//! so an installed recorder (prometheus, statsd) sees the same counters;
//! without a recorder installed, the facade calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `jobscout_` and counters end in `_total`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Gateway invocations, cache hits included.
pub const INVOCATIONS_TOTAL: &str = "jobscout_invocations_total";

/// Agent call attempts (each retry counts).
pub const MODEL_CALLS_TOTAL: &str = "jobscout_model_calls_total";

/// Invocations answered from the response cache.
pub const CACHE_HITS_TOTAL: &str = "jobscout_cache_hits_total";

/// Invocations that missed the response cache.
pub const CACHE_MISSES_TOTAL: &str = "jobscout_cache_misses_total";

/// Invocations that had to wait for a rate limiter slot.
pub const RATE_LIMITED_WAITS_TOTAL: &str = "jobscout_rate_limited_waits_total";

/// Retry attempts after a retryable agent failure (not counting the first call).
pub const RETRIES_TOTAL: &str = "jobscout_retries_total";

/// Errors seen by the gateway: failed attempts and admission refusals.
pub const ERRORS_TOTAL: &str = "jobscout_errors_total";

/// Named invocation counter.
///
/// A closed set: a counter that is not listed here cannot be incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalInvocations,
    ModelCalls,
    CacheHits,
    CacheMisses,
    RateLimitedWaits,
    Retries,
    Errors,
}

impl Counter {
    pub const ALL: [Counter; 7] = [
        Counter::TotalInvocations,
        Counter::ModelCalls,
        Counter::CacheHits,
        Counter::CacheMisses,
        Counter::RateLimitedWaits,
        Counter::Retries,
        Counter::Errors,
    ];

    /// Name used in [`MetricsSnapshot`] and the JSON metrics endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Counter::TotalInvocations => "total_invocations",
            Counter::ModelCalls => "model_calls",
            Counter::CacheHits => "cache_hits",
            Counter::CacheMisses => "cache_misses",
            Counter::RateLimitedWaits => "rate_limited_waits",
            Counter::Retries => "retries",
            Counter::Errors => "errors",
        }
    }

    /// Name used with the `metrics` facade.
    pub fn metric_name(self) -> &'static str {
        match self {
            Counter::TotalInvocations => INVOCATIONS_TOTAL,
            Counter::ModelCalls => MODEL_CALLS_TOTAL,
            Counter::CacheHits => CACHE_HITS_TOTAL,
            Counter::CacheMisses => CACHE_MISSES_TOTAL,
            Counter::RateLimitedWaits => RATE_LIMITED_WAITS_TOTAL,
            Counter::Retries => RETRIES_TOTAL,
            Counter::Errors => ERRORS_TOTAL,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Point-in-time copy of the invocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_invocations: u64,
    pub model_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rate_limited_waits: u64,
    pub retries: u64,
    pub errors: u64,
}

impl MetricsSnapshot {
    /// Value of a single counter.
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::TotalInvocations => self.total_invocations,
            Counter::ModelCalls => self.model_calls,
            Counter::CacheHits => self.cache_hits,
            Counter::CacheMisses => self.cache_misses,
            Counter::RateLimitedWaits => self.rate_limited_waits,
            Counter::Retries => self.retries,
            Counter::Errors => self.errors,
        }
    }
}

/// Process-wide invocation counters.
///
/// Starts at zero and only ever increases.
#[derive(Debug, Default)]
pub struct InvocationMetrics {
    counters: [AtomicU64; 7],
}

impl InvocationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `counter`.
    pub fn increment(&self, counter: Counter) {
        self.counters[counter.index()].fetch_add(1, Ordering::Relaxed);
        metrics::counter!(counter.metric_name()).increment(1);
    }

    /// Current value of a single counter.
    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].load(Ordering::Relaxed)
    }

    /// Independent copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_invocations: self.get(Counter::TotalInvocations),
            model_calls: self.get(Counter::ModelCalls),
            cache_hits: self.get(Counter::CacheHits),
            cache_misses: self.get(Counter::CacheMisses),
            rate_limited_waits: self.get(Counter::RateLimitedWaits),
            retries: self.get(Counter::Retries),
            errors: self.get(Counter::Errors),
        }
    }
}
