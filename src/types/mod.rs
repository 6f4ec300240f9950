//! Public types for the jobscout API.

mod message;
mod opportunity;
mod payload;
mod response;

pub use message::{Message, Role};
pub use opportunity::Opportunity;
pub use payload::{
    ContextItem, MessageList, Payload, SearchContext, SearchResult, StructuredRequest,
};
pub use response::AgentResponse;
