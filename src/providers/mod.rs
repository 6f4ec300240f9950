//! Agent, search and summarizer implementations, plus the admission and retry
//! machinery the gateway wraps around agent calls.

pub mod llm_agent;
pub mod rate_limit;
pub mod retry;
pub mod summarize;
pub mod tavily;
pub mod traits;

pub use llm_agent::{AgentBackend, LlmAgentCaller};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use retry::RetryConfig;
pub use summarize::TruncatingSummarizer;
pub use tavily::{NoopSearch, TavilySearch};
pub use traits::{AgentCaller, SearchProvider, Summarizer};
