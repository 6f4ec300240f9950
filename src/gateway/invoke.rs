//! AgentGateway - cached, rate-limited, retrying agent invocation

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cache::{InvocationKey, ResponseCache};
use crate::providers::retry::with_retry;
use crate::providers::{AgentCaller, RateLimiter, RetryConfig, Summarizer};
use crate::telemetry::{Counter, InvocationMetrics, MetricsSnapshot};
use crate::types::{AgentResponse, Message, Payload};
use crate::Result;

use super::AgentGatewayBuilder;

/// Heading placed between the user text and the summarized search context.
pub const SEARCH_CONTEXT_HEADING: &str = "\n\n## Search Context:\n";

/// Orchestrates agent invocations.
///
/// Each [`invoke`](Self::invoke) normalizes the payload, checks the response
/// cache, reserves a rate-limit slot on a miss, then calls the agent with
/// retry. Counters for every step are kept in [`InvocationMetrics`].
///
/// Shared across tasks behind an `Arc`; all state uses its own short-lived
/// locks, none held across an await.
pub struct AgentGateway {
    pub(super) agent: Arc<dyn AgentCaller>,
    pub(super) summarizer: Arc<dyn Summarizer>,
    pub(super) system_prompt: String,
    pub(super) limiter: RateLimiter,
    pub(super) cache: ResponseCache,
    pub(super) retry: RetryConfig,
    pub(super) metrics: InvocationMetrics,
}

impl AgentGateway {
    pub fn builder() -> AgentGatewayBuilder {
        AgentGatewayBuilder::new()
    }

    /// Invoke the agent on a payload.
    ///
    /// Fails with `RateLimitExceeded` when no slot frees up within the
    /// configured max wait, or with `Agent` when the agent fails fatally or
    /// keeps failing retryably until attempts run out.
    #[instrument(name = "gateway.invoke", skip_all, fields(agent = %self.agent.name()))]
    pub async fn invoke(&self, payload: impl Into<Payload>) -> Result<AgentResponse> {
        let payload = payload.into();
        let messages = self.normalize(&payload);
        let key = InvocationKey::for_messages(&messages)?;

        self.metrics.increment(Counter::TotalInvocations);
        info!(key = %key, "invoking agent");

        if let Some(hit) = self.cache.get(&key) {
            self.metrics.increment(Counter::CacheHits);
            info!(key = %key, "cache hit");
            return Ok(hit);
        }
        self.metrics.increment(Counter::CacheMisses);
        debug!(key = %key, "cache miss");

        let wait = match self.limiter.admit() {
            Ok(wait) => wait,
            Err(e) => {
                self.metrics.increment(Counter::Errors);
                warn!(key = %key, error = %e, "rate limit refused call");
                return Err(e);
            }
        };
        if !wait.is_zero() {
            self.metrics.increment(Counter::RateLimitedWaits);
            warn!(key = %key, wait_ms = wait.as_millis() as u64, "rate limit reached, sleeping");
            tokio::time::sleep(wait).await;
        }

        let response = with_retry(&self.retry, &self.metrics, &key, || {
            self.agent.call(&messages)
        })
        .await?;

        self.cache.put(&key, response.clone());
        Ok(response)
    }

    /// Invoke the agent on an untyped JSON payload.
    ///
    /// A payload that matches no known shape fails with `InvalidPayload`
    /// and counts as an invocation error.
    pub async fn invoke_json(&self, value: Value) -> Result<AgentResponse> {
        let payload = match Payload::from_json(value) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.increment(Counter::Errors);
                return Err(e);
            }
        };
        self.invoke(payload).await
    }

    /// Build the canonical `[system, user]` message list for a payload.
    ///
    /// Attached search context is condensed by the summarizer and appended
    /// under a `## Search Context:` heading.
    pub fn normalize(&self, payload: &Payload) -> Vec<Message> {
        let mut text = payload.normalized_text();
        if let Some(context) = payload.search_context() {
            let summary = self.summarizer.condense(context);
            debug!(results = summary.len(), "including summarized search context");
            text.push_str(SEARCH_CONTEXT_HEADING);
            text.push_str(&summary.render());
        }
        vec![
            Message::system(self.system_prompt.as_str()),
            Message::user(text),
        ]
    }

    /// Point-in-time copy of the invocation counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The summarizer applied to search context.
    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }
}

impl std::fmt::Debug for AgentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGateway")
            .field("agent", &self.agent.name())
            .field("limiter", self.limiter.config())
            .field("cache_ttl", &self.cache.ttl())
            .field("retry", &self.retry)
            .finish()
    }
}
