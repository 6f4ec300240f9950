//! Tavily web search client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::types::SearchResult;
use crate::{JobscoutError, Result};

use super::traits::SearchProvider;

/// Default Tavily API endpoint.
pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily API client.
pub struct TavilySearch {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| JobscoutError::Http(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: DEFAULT_TAVILY_URL.to_string(),
        })
    }

    /// Override the API base URL. The search endpoint is `{base}/search`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    #[instrument(name = "search.tavily", skip(self), fields(query_len = query.len()))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            max_results,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| JobscoutError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(JobscoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| JobscoutError::Search(format!("bad Tavily response: {e}")))?;

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(|r| SearchResult::new(r.title, r.url, r.content))
            .collect())
    }
}

/// Search provider used when no Tavily key is configured.
pub struct NoopSearch;

#[async_trait]
impl SearchProvider for NoopSearch {
    fn name(&self) -> &str {
        "noop"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        warn!("search called but no Tavily API key configured");
        Ok(vec![])
    }
}
