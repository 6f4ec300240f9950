//! Configuration loading for the jobscout service.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `./jobscout.toml`
//! 3. `~/.jobscout/config.toml`
//! 4. built-in defaults
//!
//! Environment variables are applied on top (see [`Config::apply_env`]).
//!
//! Secrets are loaded separately with a mandatory permission check from
//! `~/.jobscout/secrets.toml` (must be 0600 or 0400), each falling back to
//! its environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::pipeline::PipelineSettings;
use crate::prompts::{AGENT_PROMPT, SEARCH_MAX_RESULTS, SEARCH_QUERY};
use crate::providers::llm_agent::{DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::providers::{LlmAgentCaller, RateLimitConfig, RetryConfig};
use crate::{JobscoutError, Result};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8004).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8004".to_string()
}

/// Which model backend answers invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    Gemini,
}

/// Agent backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(default = "default_ollama_url")]
    pub ollama_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Request timeout in seconds (default: 120).
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            ollama_model: default_ollama_model(),
            ollama_base_url: default_ollama_url(),
            gemini_model: default_gemini_model(),
            timeout_secs: default_agent_timeout(),
        }
    }
}

fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_agent_timeout() -> u64 {
    120
}

/// Rate limit, cache and retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Whether the rate limiter runs. Unset means "only for Gemini".
    #[serde(default)]
    pub rate_limit_enabled: Option<bool>,
    /// Calls per rolling minute (default: 2).
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    /// Longest admission wait in seconds (default: 30).
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
    /// Response cache TTL in seconds (default: 600).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Response cache capacity (default: 10000).
    #[serde(default = "default_cache_entries")]
    pub cache_max_entries: u64,
    /// Agent call attempts, including the first (default: 4).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: None,
            requests_per_minute: default_rpm(),
            max_wait_secs: default_max_wait(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_entries(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_rpm() -> u32 {
    2
}

fn default_max_wait() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_cache_entries() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    4
}

/// Search settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// User prompt sent with the search results.
    #[serde(default = "default_agent_prompt")]
    pub agent_prompt: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            max_results: default_max_results(),
            agent_prompt: default_agent_prompt(),
        }
    }
}

fn default_query() -> String {
    SEARCH_QUERY.to_string()
}

fn default_max_results() -> usize {
    SEARCH_MAX_RESULTS
}

fn default_agent_prompt() -> String {
    AGENT_PROMPT.to_string()
}

/// Daily run schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression in UTC (default: 04:00 UTC, 05:00 in Douala).
    #[serde(default = "default_cron")]
    pub cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: default_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cron() -> String {
    "0 0 4 * * *".to_string()
}

/// Email delivery settings. Credentials live in [`Secrets`].
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Recipients of the daily digest.
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            recipients: Vec::new(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

/// Opportunity store settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON lines file; unset keeps seen opportunities in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations, then apply
    /// environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            JobscoutError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            JobscoutError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path. `None` means "use defaults".
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(JobscoutError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        let local = PathBuf::from("jobscout.toml");
        if local.exists() {
            return Ok(Some(local));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".jobscout").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// | variable | setting |
    /// |---|---|
    /// | `USE_GEMINI` | `agent.backend` (`true` selects Gemini) |
    /// | `OLLAMA_MODEL`, `OLLAMA_BASE_URL`, `GEMINI_MODEL` | `agent.*` |
    /// | `GEMINI_MAX_RPM`, `GEMINI_MAX_WAIT`, `GEMINI_CACHE_TTL`, `RATE_LIMIT_ENABLED` | `limits.*` |
    /// | `HOST`, `PORT` | `server.address` |
    /// | `SMTP_HOST`, `SMTP_PORT`, `JOB_RECIPIENTS` (comma separated) | `email.*` |
    /// | `STORE_PATH` | `store.path` |
    /// | `JOB_SCHEDULE` | `schedule.cron` |
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("USE_GEMINI") {
            self.agent.backend = if parse_flag(&v) {
                BackendKind::Gemini
            } else {
                BackendKind::Ollama
            };
        }
        if let Some(v) = lookup("OLLAMA_MODEL") {
            self.agent.ollama_model = v;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            self.agent.ollama_base_url = v;
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            self.agent.gemini_model = v;
        }

        if let Some(v) = lookup("GEMINI_MAX_RPM") {
            self.limits.requests_per_minute = parse_number("GEMINI_MAX_RPM", &v)?;
        }
        if let Some(v) = lookup("GEMINI_MAX_WAIT") {
            self.limits.max_wait_secs = parse_number("GEMINI_MAX_WAIT", &v)?;
        }
        if let Some(v) = lookup("GEMINI_CACHE_TTL") {
            self.limits.cache_ttl_secs = parse_number("GEMINI_CACHE_TTL", &v)?;
        }
        if let Some(v) = lookup("RATE_LIMIT_ENABLED") {
            self.limits.rate_limit_enabled = Some(parse_flag(&v));
        }

        let host = lookup("HOST");
        let port = lookup("PORT");
        if host.is_some() || port.is_some() {
            let (current_host, current_port) = self
                .server
                .address
                .rsplit_once(':')
                .map(|(h, p)| (h.to_string(), p.to_string()))
                .unwrap_or_else(|| (self.server.address.clone(), "8004".to_string()));
            let port = match port {
                Some(p) => parse_number::<u16>("PORT", &p)?.to_string(),
                None => current_port,
            };
            self.server.address = format!("{}:{}", host.unwrap_or(current_host), port);
        }

        if let Some(v) = lookup("SMTP_HOST") {
            self.email.smtp_host = Some(v).filter(|h| !h.is_empty());
        }
        if let Some(v) = lookup("SMTP_PORT") {
            self.email.smtp_port = parse_number("SMTP_PORT", &v)?;
        }
        if let Some(v) = lookup("JOB_RECIPIENTS") {
            self.email.recipients = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = lookup("STORE_PATH") {
            self.store.path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("JOB_SCHEDULE") {
            self.schedule.cron = v;
        }
        Ok(())
    }

    /// Whether the rate limiter runs: explicit setting, else only for Gemini.
    pub fn rate_limit_enabled(&self) -> bool {
        self.limits
            .rate_limit_enabled
            .unwrap_or(self.agent.backend == BackendKind::Gemini)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::new()
            .enabled(self.rate_limit_enabled())
            .requests_per_minute(self.limits.requests_per_minute)
            .max_wait(Duration::from_secs(self.limits.max_wait_secs))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.limits.cache_ttl_secs))
            .max_entries(self.limits.cache_max_entries)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new().max_attempts(self.limits.max_attempts)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            query: self.search.query.clone(),
            max_results: self.search.max_results,
            agent_prompt: self.search.agent_prompt.clone(),
            recipients: self.email.recipients.clone(),
        }
    }

    /// Build the configured agent. Gemini requires an API key.
    pub fn agent_caller(&self, secrets: &Secrets) -> Result<LlmAgentCaller> {
        let agent = match self.agent.backend {
            BackendKind::Ollama => LlmAgentCaller::new(
                crate::providers::AgentBackend::Ollama {
                    base_url: self.agent.ollama_base_url.clone(),
                },
                self.agent.ollama_model.as_str(),
            ),
            BackendKind::Gemini => {
                let key = secrets.gemini_api_key.clone().ok_or_else(|| {
                    JobscoutError::Configuration(
                        "Gemini API key missing. Set GOOGLE_API_KEY or GEMINI_API_KEY, \
                         or unset USE_GEMINI to use the local Ollama model"
                            .to_string(),
                    )
                })?;
                LlmAgentCaller::gemini(key, self.agent.gemini_model.as_str())
            }
        };
        Ok(agent.timeout_secs(self.agent.timeout_secs).temperature(0.0))
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        JobscoutError::Configuration(format!("{name} must be a non-negative integer, got {value:?}"))
    })
}

/// Secrets file layout.
#[derive(Debug, Clone, Default, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    gemini: Option<ApiKeySecret>,
    #[serde(default)]
    tavily: Option<ApiKeySecret>,
    #[serde(default)]
    smtp: Option<SmtpSecret>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiKeySecret {
    api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SmtpSecret {
    username: String,
    password: String,
}

/// Resolved secrets.
#[derive(Clone, Default)]
pub struct Secrets {
    pub gemini_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    /// Sender address used as the SMTP login.
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Secrets")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &redact(&self.smtp_password))
            .finish()
    }
}

impl Secrets {
    /// Load `~/.jobscout/secrets.toml` (if present, must be 0600) and fill
    /// anything it lacks from the environment.
    pub fn load() -> Result<Self> {
        let from_file = match dirs::home_dir().map(|h| h.join(".jobscout").join("secrets.toml")) {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            // no secrets file: env vars only
            _ => Secrets::default(),
        };
        Ok(from_file.with_env_fallback(|name| std::env::var(name).ok()))
    }

    /// Load secrets from a specific file, checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            JobscoutError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            JobscoutError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let file: SecretsFile = toml::from_str(content)?;
        let (smtp_username, smtp_password) = match file.smtp {
            Some(s) => (Some(s.username), Some(s.password)),
            None => (None, None),
        };
        Ok(Self {
            gemini_api_key: file.gemini.map(|s| s.api_key),
            tavily_api_key: file.tavily.map(|s| s.api_key),
            smtp_username,
            smtp_password,
        })
    }

    /// Fill unset secrets from environment variables read through `lookup`.
    ///
    /// `GOOGLE_API_KEY` wins over `GEMINI_API_KEY`. Empty values count as unset.
    pub fn with_env_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| lookup(name).filter(|v| !v.is_empty());
        self.gemini_api_key = self
            .gemini_api_key
            .or_else(|| env("GOOGLE_API_KEY"))
            .or_else(|| env("GEMINI_API_KEY"));
        self.tavily_api_key = self.tavily_api_key.or_else(|| env("TAVILY_API_KEY"));
        self.smtp_username = self.smtp_username.or_else(|| env("SMTP_EMAIL"));
        self.smtp_password = self.smtp_password.or_else(|| env("SMTP_PASSWORD"));
        self
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            JobscoutError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(JobscoutError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }
}
