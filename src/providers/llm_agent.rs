//! LLM crate wrapper implementing [`AgentCaller`].
//!
//! [`LlmAgentCaller`] stores backend configuration and builds an llm provider
//! per call, since the system prompt is a build-time setting in the llm crate.
//! Upstream failures are classified by [`AgentError::from_upstream`], so quota
//! errors (`429`, `RESOURCE_EXHAUSTED`, "quota") come back retryable.

use async_trait::async_trait;
use llm::LLMProvider;
use llm::builder::{LLMBackend, LLMBuilder};
use tracing::instrument;

use crate::AgentError;
use crate::convert::to_llm_messages;
use crate::types::{AgentResponse, Message};

use super::traits::AgentCaller;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default local model.
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";
/// Default hosted model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Which model host to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentBackend {
    /// Local Ollama server.
    Ollama { base_url: String },
    /// Hosted Gemini API.
    Gemini { api_key: String },
}

impl AgentBackend {
    fn llm_backend(&self) -> LLMBackend {
        match self {
            AgentBackend::Ollama { .. } => LLMBackend::Ollama,
            AgentBackend::Gemini { .. } => LLMBackend::Google,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            AgentBackend::Ollama { .. } => "ollama",
            AgentBackend::Gemini { .. } => "gemini",
        }
    }
}

/// Agent backed by the llm crate.
///
/// # Example
///
/// ```ignore
/// use jobscout::providers::{AgentBackend, LlmAgentCaller};
///
/// let agent = LlmAgentCaller::new(
///     AgentBackend::Gemini { api_key: "your-key".into() },
///     "gemini-2.0-flash",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LlmAgentCaller {
    backend: AgentBackend,
    model: String,
    /// Request timeout in seconds
    timeout_secs: u64,
    temperature: Option<f32>,
}

impl LlmAgentCaller {
    pub fn new(backend: AgentBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            timeout_secs: 120,
            temperature: None,
        }
    }

    /// Local Ollama agent with the default URL.
    pub fn ollama(model: impl Into<String>) -> Self {
        Self::new(
            AgentBackend::Ollama {
                base_url: DEFAULT_OLLAMA_URL.to_string(),
            },
            model,
        )
    }

    /// Hosted Gemini agent.
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(
            AgentBackend::Gemini {
                api_key: api_key.into(),
            },
            model,
        )
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn backend(&self) -> &AgentBackend {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_provider(
        &self,
        system_prompt: Option<&str>,
    ) -> Result<Box<dyn LLMProvider>, AgentError> {
        let mut builder = LLMBuilder::new()
            .backend(self.backend.llm_backend())
            .model(&self.model)
            .timeout_seconds(self.timeout_secs);

        match &self.backend {
            AgentBackend::Ollama { base_url } => builder = builder.base_url(base_url.clone()),
            AgentBackend::Gemini { api_key } => builder = builder.api_key(api_key),
        }
        if let Some(sys) = system_prompt {
            builder = builder.system(sys);
        }
        if let Some(temp) = self.temperature {
            builder = builder.temperature(temp);
        }

        // a build failure is a configuration problem, never a quota one
        builder.build().map_err(|e| AgentError::fatal(e.to_string()))
    }
}

#[async_trait]
impl AgentCaller for LlmAgentCaller {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(name = "agent.call", skip(self, messages), fields(model = %self.model, backend = %self.backend.name()))]
    async fn call(&self, messages: &[Message]) -> Result<AgentResponse, AgentError> {
        let (system_prompt, llm_messages) = to_llm_messages(messages);
        let provider = self.build_provider(system_prompt.as_deref())?;

        let response = provider.chat(&llm_messages).await?;

        Ok(AgentResponse::new(response.text().unwrap_or_default()).with_model(self.model.clone()))
    }
}
