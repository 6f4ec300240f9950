//! Builder for configuring gateway instances

use std::sync::Arc;

use super::AgentGateway;
use crate::cache::{CacheConfig, ResponseCache};
use crate::prompts::SYSTEM_PROMPT;
use crate::providers::{
    AgentCaller, RateLimitConfig, RateLimiter, RetryConfig, Summarizer, TruncatingSummarizer,
};
use crate::telemetry::InvocationMetrics;
use crate::{JobscoutError, Result};

/// Builder for [`AgentGateway`].
///
/// Only the agent is required; everything else has defaults (truncating
/// summarizer, 2 calls/min with a 30 s max wait, 600 s cache TTL, 4 attempts).
///
/// ```rust,ignore
/// use jobscout::{AgentGateway, RateLimitConfig};
/// use jobscout::providers::LlmAgentCaller;
///
/// let gateway = AgentGateway::builder()
///     .agent(LlmAgentCaller::ollama("mistral"))
///     .rate_limit(RateLimitConfig::disabled())
///     .build()?;
/// ```
pub struct AgentGatewayBuilder {
    agent: Option<Arc<dyn AgentCaller>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    system_prompt: String,
    rate_limit: RateLimitConfig,
    cache: CacheConfig,
    retry: RetryConfig,
}

impl AgentGatewayBuilder {
    pub fn new() -> Self {
        Self {
            agent: None,
            summarizer: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the agent that answers invocations.
    pub fn agent(self, agent: impl AgentCaller + 'static) -> Self {
        self.shared_agent(Arc::new(agent))
    }

    /// Set an agent that is shared with other owners.
    pub fn shared_agent(mut self, agent: Arc<dyn AgentCaller>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Replace the search context summarizer.
    pub fn summarizer(mut self, summarizer: impl Summarizer + 'static) -> Self {
        self.summarizer = Some(Arc::new(summarizer));
        self
    }

    /// Replace the system prompt sent ahead of every user message.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Build the gateway.
    ///
    /// Fails with [`JobscoutError::NoAgent`] when no agent was set.
    pub fn build(self) -> Result<AgentGateway> {
        let agent = self.agent.ok_or(JobscoutError::NoAgent)?;
        let summarizer = self
            .summarizer
            .unwrap_or_else(|| Arc::new(TruncatingSummarizer::default()));

        Ok(AgentGateway {
            agent,
            summarizer,
            system_prompt: self.system_prompt,
            limiter: RateLimiter::new(self.rate_limit),
            cache: ResponseCache::new(&self.cache),
            retry: self.retry,
            metrics: InvocationMetrics::new(),
        })
    }
}

impl Default for AgentGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
