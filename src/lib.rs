//! jobscout - scheduled search, LLM extraction and email digest for
//! international job opportunities.
//!
//! The core is [`AgentGateway`], which wraps a language-model agent with a
//! response cache, a rolling-window rate limiter, retry with exponential
//! backoff on quota errors, and invocation counters. The [`pipeline`] module
//! builds the daily job search on top of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use jobscout::{AgentGateway, RateLimitConfig};
//! use jobscout::providers::LlmAgentCaller;
//!
//! #[tokio::main]
//! async fn main() -> jobscout::Result<()> {
//!     let gateway = AgentGateway::builder()
//!         .agent(LlmAgentCaller::ollama("mistral"))
//!         .rate_limit(RateLimitConfig::disabled())
//!         .build()?;
//!
//!     let response = gateway.invoke("Find Ausbildung programs in Bavaria").await?;
//!     println!("{}", response.output);
//!     println!("{:?}", gateway.metrics());
//!     Ok(())
//! }
//! ```

pub mod build_info;
pub mod cache;
mod convert;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod pipeline;
pub mod prompts;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use build_info::{BuildInfo, PKG_VERSION};
pub use cache::CacheConfig;
pub use error::{AgentError, JobscoutError, Result};
pub use gateway::{AgentGateway, AgentGatewayBuilder};
pub use providers::{RateLimitConfig, RetryConfig};
pub use telemetry::{Counter, MetricsSnapshot};
pub use types::{
    AgentResponse, ContextItem, Message, MessageList, Opportunity, Payload, Role, SearchContext,
    SearchResult, StructuredRequest,
};
