//! The job search pipeline: search, summarize, invoke the agent, dedupe,
//! store and email.
//!
//! [`Pipeline::run_scheduled`] is the daily cron run;
//! [`Pipeline::run_manual`] backs `POST /search-opportunities`.

mod parse;

pub use parse::{count_job_blocks, parse_opportunities};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::notify::{Email, Mailer, render_html, render_text};
use crate::prompts::{AGENT_PROMPT, NO_OPPORTUNITIES, SEARCH_MAX_RESULTS, SEARCH_QUERY};
use crate::providers::SearchProvider;
use crate::store::OpportunityStore;
use crate::types::{AgentResponse, Opportunity, SearchContext, StructuredRequest};
use crate::{AgentGateway, Result};

/// Subject of the daily digest.
pub const SCHEDULED_SUBJECT: &str = "New Germany Ausbildung & Canada Visa Jobs";
/// Subject of manually requested results.
pub const MANUAL_SUBJECT: &str = "New International Job Opportunities";

/// What the pipeline searches for, and who hears about it.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub query: String,
    pub max_results: usize,
    /// User prompt sent with the search context.
    pub agent_prompt: String,
    /// Recipients of the daily digest.
    pub recipients: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            query: SEARCH_QUERY.to_string(),
            max_results: SEARCH_MAX_RESULTS,
            agent_prompt: AGENT_PROMPT.to_string(),
            recipients: Vec::new(),
        }
    }
}

/// Outcome of a scheduled run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    /// Opportunities parsed from the agent output.
    pub found: usize,
    /// Opportunities not seen before; saved during this run.
    pub new_items: Vec<Opportunity>,
    /// Recipients the digest was delivered to.
    pub emails_sent: usize,
}

/// Response of a manual run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualReport {
    pub output: String,
    /// Number of `Job N:` blocks in `output`.
    pub count: usize,
    pub format: &'static str,
}

/// Wires the gateway to search, storage and email.
pub struct Pipeline {
    gateway: Arc<AgentGateway>,
    search: Arc<dyn SearchProvider>,
    store: Arc<dyn OpportunityStore>,
    mailer: Arc<dyn Mailer>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        gateway: Arc<AgentGateway>,
        search: Arc<dyn SearchProvider>,
        store: Arc<dyn OpportunityStore>,
        mailer: Arc<dyn Mailer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            gateway,
            search,
            store,
            mailer,
            settings,
        }
    }

    pub fn gateway(&self) -> &Arc<AgentGateway> {
        &self.gateway
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn search_name(&self) -> &str {
        self.search.name()
    }

    pub fn mailer_name(&self) -> &str {
        self.mailer.name()
    }

    /// Run a search and condense the results. No agent call.
    #[instrument(name = "pipeline.preview", skip(self), fields(provider = %self.search.name()))]
    pub async fn preview(&self, query: &str, max_results: usize) -> Result<SearchContext> {
        let results = self.search.search(query, max_results).await?;
        let raw = results.len();
        let condensed = self
            .gateway
            .summarizer()
            .condense(&SearchContext::results(results));
        info!(raw, condensed = condensed.len(), "search results summarized");
        Ok(condensed)
    }

    /// Search for `query` and have the agent analyze the results.
    pub async fn analyze(&self, query: &str) -> Result<AgentResponse> {
        let context = self.preview(query, self.settings.max_results).await?;
        let request =
            StructuredRequest::input(self.settings.agent_prompt.as_str()).with_search_context(context);
        self.gateway.invoke(request).await
    }

    /// The daily run: find new opportunities, store them and email the digest.
    ///
    /// Search and agent failures are returned. Output that cannot be parsed
    /// ends the run early with an empty report.
    #[instrument(name = "pipeline.scheduled", skip(self))]
    pub async fn run_scheduled(&self) -> Result<RunReport> {
        let mut report = RunReport {
            started_at: Utc::now(),
            found: 0,
            new_items: Vec::new(),
            emails_sent: 0,
        };
        info!("running daily opportunity search");

        let response = self.analyze(&self.settings.query).await?;
        let opportunities = match parse_opportunities(&response.output) {
            Ok(opportunities) => opportunities,
            Err(e) => {
                error!(error = %e, "failed to parse agent output");
                return Ok(report);
            }
        };
        report.found = opportunities.len();
        info!(found = report.found, "parsed opportunities from agent output");

        for opportunity in opportunities {
            if self.store.exists(&opportunity).await? {
                continue;
            }
            self.store.save(&opportunity).await?;
            report.new_items.push(opportunity);
        }

        if report.new_items.is_empty() {
            info!("no new opportunities found today");
            return Ok(report);
        }

        info!(
            new = report.new_items.len(),
            recipients = self.settings.recipients.len(),
            mailer = self.mailer.name(),
            "sending digest"
        );
        let text = render_text(&report.new_items);
        let html = render_html(&report.new_items);
        for recipient in &self.settings.recipients {
            let email =
                Email::new(recipient.as_str(), SCHEDULED_SUBJECT, text.as_str()).with_html(html.as_str());
            match self.mailer.send(&email).await {
                Ok(()) => report.emails_sent += 1,
                Err(e) => error!(
                    to = %recipient,
                    mailer = self.mailer.name(),
                    error = %e,
                    "failed to send digest"
                ),
            }
        }
        Ok(report)
    }

    /// A manually triggered search, for `query` or the configured query.
    ///
    /// Emails the agent output to `email` unless it is blank or reports no
    /// new opportunities. A failed email is logged, not returned.
    #[instrument(name = "pipeline.manual", skip(self, email))]
    pub async fn run_manual(
        &self,
        query: Option<&str>,
        email: Option<&str>,
    ) -> Result<ManualReport> {
        info!("received manual search request");
        let query = query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(&self.settings.query);
        let output = self.analyze(query).await?.output;

        if let Some(to) = email.filter(|to| !to.trim().is_empty())
            && !output.trim().is_empty()
            && !output.contains(NO_OPPORTUNITIES)
        {
            let message = Email::new(to, MANUAL_SUBJECT, output.as_str());
            if let Err(e) = self.mailer.send(&message).await {
                warn!(
                    to = %to,
                    mailer = self.mailer.name(),
                    error = %e,
                    "failed to email manual search results"
                );
            }
        }

        Ok(ManualReport {
            count: count_job_blocks(&output),
            output,
            format: "readable_text",
        })
    }
}
