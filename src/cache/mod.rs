//! Caching subsystem.
//!
//! - [`InvocationKey`]: canonical, deterministic key for one logical agent
//!   request. Built by the gateway from the normalized message list.
//!
//! - [`ResponseCache`]: TTL cache of agent responses keyed on
//!   [`InvocationKey`], bounded by an LRU capacity. Owned by
//!   [`AgentGateway`](crate::AgentGateway); a hit bypasses rate limiting and
//!   the agent call entirely.

pub mod key;
pub mod response;

pub use key::InvocationKey;
pub use response::{CacheConfig, ResponseCache};
