//! HTTP service, scheduler and configuration.
//!
//! This module provides:
//! - Configuration and secrets loading (`config`)
//! - The axum router (`routes`)
//! - The daily cron job (`scheduler`)
//! - [`build_pipeline`], which wires configured collaborators together

pub mod config;
pub mod routes;
pub mod scheduler;

pub use routes::{ApiError, AppState, router};
pub use scheduler::start_scheduler;

use std::sync::Arc;

use tracing::{info, warn};

use crate::notify::{LogMailer, Mailer, SmtpConfig, SmtpMailer};
use crate::pipeline::Pipeline;
use crate::providers::{NoopSearch, SearchProvider, TavilySearch};
use crate::store::{JsonlStore, MemoryStore, OpportunityStore};
use crate::{AgentGateway, Result};

use config::{Config, Secrets};

/// Build the gateway from configuration.
pub fn build_gateway(config: &Config, secrets: &Secrets) -> Result<AgentGateway> {
    let agent = config.agent_caller(secrets)?;
    info!(
        backend = agent.backend().name(),
        model = agent.model(),
        rate_limited = config.rate_limit_enabled(),
        "agent configured"
    );
    AgentGateway::builder()
        .agent(agent)
        .rate_limit(config.rate_limit_config())
        .cache(config.cache_config())
        .retry(config.retry_config())
        .build()
}

/// Build the full pipeline: gateway, search, store and mailer.
///
/// Missing optional collaborators degrade instead of failing: no Tavily key
/// means empty searches, no SMTP settings means logged emails, no store path
/// means an in-memory store.
pub async fn build_pipeline(config: &Config, secrets: &Secrets) -> Result<Arc<Pipeline>> {
    let gateway = Arc::new(build_gateway(config, secrets)?);

    let search: Arc<dyn SearchProvider> = match &secrets.tavily_api_key {
        Some(key) => Arc::new(TavilySearch::new(key.as_str())?),
        None => {
            warn!("TAVILY_API_KEY not set, searches will return nothing");
            Arc::new(NoopSearch)
        }
    };

    let store: Arc<dyn OpportunityStore> = match &config.store.path {
        Some(path) => Arc::new(JsonlStore::open(path).await?),
        None => {
            warn!("no store path configured, seen opportunities are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match (
        &config.email.smtp_host,
        &secrets.smtp_username,
        &secrets.smtp_password,
    ) {
        (Some(host), Some(username), Some(password)) => Arc::new(SmtpMailer::new(SmtpConfig {
            host: host.clone(),
            port: config.email.smtp_port,
            username: username.clone(),
            password: password.clone(),
        })?),
        _ => {
            warn!("SMTP not fully configured, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    info!(
        agent = gateway.agent_name(),
        search = search.name(),
        mailer = mailer.name(),
        "pipeline ready"
    );
    Ok(Arc::new(Pipeline::new(
        gateway,
        search,
        store,
        mailer,
        config.pipeline_settings(),
    )))
}
