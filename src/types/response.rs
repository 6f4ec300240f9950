//! Agent response type

use serde::{Deserialize, Serialize};

/// Response produced by an [`AgentCaller`](crate::providers::AgentCaller).
///
/// Cached verbatim by the gateway, so it must stay cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Text output of the agent.
    pub output: String,
    /// Model that produced the output, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AgentResponse {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
