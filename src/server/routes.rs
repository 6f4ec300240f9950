//! HTTP routes (axum).
//!
//! | route | handler |
//! |---|---|
//! | `POST /search-opportunities` | manual pipeline run, optional `{query, email}` body |
//! | `GET /preview-search` | search + summarize, no agent call |
//! | `GET /metrics` | invocation counters |
//! | `POST /invoke` | raw agent invocation on any payload shape |
//! | `GET /health` | liveness, wired agent/search/mailer, build metadata |

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use crate::JobscoutError;
use crate::build_info::BuildInfo;
use crate::pipeline::{ManualReport, Pipeline};
use crate::telemetry::MetricsSnapshot;
use crate::types::{AgentResponse, SearchContext};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search-opportunities", post(search_opportunities))
        .route("/preview-search", get(preview_search))
        .route("/metrics", get(metrics))
        .route("/invoke", post(invoke))
        .route("/health", get(health))
        .with_state(state)
}

/// Error response: maps [`JobscoutError`] to an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub JobscoutError);

impl From<JobscoutError> for ApiError {
    fn from(err: JobscoutError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            JobscoutError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            JobscoutError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            JobscoutError::Agent(_) | JobscoutError::Search(_) | JobscoutError::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
        }
        let mut response = (status, Json(json!({ "error": self.0.to_string() }))).into_response();
        if let JobscoutError::RateLimitExceeded { wait, .. } = &self.0 {
            // round up so clients never retry early
            let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

async fn search_opportunities(
    State(state): State<AppState>,
    body: Option<Json<SearchRequest>>,
) -> Result<Json<ManualReport>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let report = state
        .pipeline
        .run_manual(request.query.as_deref(), request.email.as_deref())
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct PreviewResponse {
    results: SearchContext,
}

async fn preview_search(State(state): State<AppState>) -> Result<Json<PreviewResponse>, ApiError> {
    let settings = state.pipeline.settings();
    let results = state
        .pipeline
        .preview(&settings.query, settings.max_results)
        .await?;
    Ok(Json(PreviewResponse { results }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.pipeline.gateway().metrics())
}

async fn invoke(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<AgentResponse>, ApiError> {
    let response = state.pipeline.gateway().invoke_json(payload).await?;
    Ok(Json(response))
}

/// Liveness plus the collaborators this instance was wired with.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
    agent: String,
    search: String,
    mailer: String,
    build: BuildInfo,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let build = BuildInfo::current();
    Json(HealthResponse {
        status: "ok",
        version: build.to_string(),
        agent: state.pipeline.gateway().agent_name().to_string(),
        search: state.pipeline.search_name().to_string(),
        mailer: state.pipeline.mailer_name().to_string(),
        build,
    })
}
