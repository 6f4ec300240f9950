//! Agent gateway: the invocation orchestrator and its builder

mod builder;
mod invoke;

pub use builder::AgentGatewayBuilder;
pub use invoke::{AgentGateway, SEARCH_CONTEXT_HEADING};
