//! Collaborator traits consumed by the gateway and the pipeline.
//!
//! Each external capability sits behind its own narrow trait so the gateway
//! can be exercised with mocks and the concrete backends can be swapped:
//!
//! - [`AgentCaller`]: the opaque language-model agent call.
//! - [`Summarizer`]: shrinks search context before it reaches the prompt.
//! - [`SearchProvider`]: web search for job postings.
//!
//! # Retry classification
//!
//! An `AgentCaller` reports failures as [`AgentError`] and decides itself
//! whether a failure is retryable. The gateway never inspects error text.

use async_trait::async_trait;

use crate::types::{AgentResponse, Message, SearchContext, SearchResult};
use crate::{AgentError, Result};

/// The language-model agent.
#[async_trait]
pub trait AgentCaller: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Run the agent on a canonical message list (system prompt first).
    async fn call(&self, messages: &[Message]) -> std::result::Result<AgentResponse, AgentError>;
}

/// Condenses search context so the prompt stays bounded.
///
/// Pure and best effort: implementations never fail, they fall back to
/// returning (a shortened copy of) their input.
pub trait Summarizer: Send + Sync {
    fn condense(&self, context: &SearchContext) -> SearchContext;
}

/// Web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Search for `query`, returning at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}
