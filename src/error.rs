//! jobscout error types

use std::time::Duration;

/// Markers in upstream error text that signal quota exhaustion or throttling.
const QUOTA_MARKERS: &[&str] = &["RESOURCE_EXHAUSTED", "429"];

/// Failure reported by an [`AgentCaller`](crate::providers::AgentCaller).
///
/// The caller decides whether the failure is worth retrying; the gateway only
/// reads [`is_retryable()`](Self::is_retryable).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AgentError {
    pub message: String,
    pub retryable: bool,
}

impl AgentError {
    /// A failure that must not be retried.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    /// A throttling failure that may succeed after backing off.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// Classify raw upstream error text.
    ///
    /// Retryable when the text carries a quota marker: `quota` in any case,
    /// an HTTP 429, or `RESOURCE_EXHAUSTED`.
    pub fn from_upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        let retryable = is_quota_exhausted(&message);
        Self { message, retryable }
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

/// Whether upstream error text signals quota exhaustion.
pub fn is_quota_exhausted(message: &str) -> bool {
    QUOTA_MARKERS.iter().any(|m| message.contains(m)) || message.to_lowercase().contains("quota")
}

impl From<llm::error::LLMError> for AgentError {
    fn from(err: llm::error::LLMError) -> Self {
        AgentError::from_upstream(err.to_string())
    }
}

/// jobscout error types
#[derive(Debug, thiserror::Error)]
pub enum JobscoutError {
    // Invocation errors
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("rate limit exceeded ({limit}/min), next slot in {wait:?}")]
    RateLimitExceeded { limit: u32, wait: Duration },

    #[error("agent call failed: {0}")]
    Agent(#[from] AgentError),

    // Collaborator errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("search failed: {0}")]
    Search(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("email error: {0}")]
    Email(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("could not parse agent output: {0}")]
    Parse(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("no agent configured")]
    NoAgent,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl JobscoutError {
    /// The underlying agent failure, if this error came from the agent.
    pub fn agent_error(&self) -> Option<&AgentError> {
        match self {
            JobscoutError::Agent(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for jobscout operations
pub type Result<T> = std::result::Result<T, JobscoutError>;
