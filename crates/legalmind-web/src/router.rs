//! Web router using Axum

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use legalmind_core::{
    Analysis, ContractAnalyzer, Fingerprint, StoreStats, Summarizer, SummarizerBackend,
    SummaryRecord,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::error::ApiError;
use crate::{page, sse};

/// Upper bound for `?limit=` on the history route
const MAX_LIST_LIMIT: usize = 500;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<ContractAnalyzer<SummarizerBackend>>,
    history_limit: usize,
}

impl AppState {
    pub fn new(analyzer: Arc<ContractAnalyzer<SummarizerBackend>>, history_limit: usize) -> Self {
        Self {
            analyzer,
            history_limit,
        }
    }

    pub fn analyzer(&self) -> &Arc<ContractAnalyzer<SummarizerBackend>> {
        &self.analyzer
    }
}

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/summaries", get(summaries_handler))
        .route("/api/summaries/{fingerprint}", get(summary_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/events", get(sse_handler))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

async fn index_handler() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let analyzer = &state.analyzer;
    let records = analyzer.store().count();

    Json(serde_json::json!({
        "status": if records.is_ok() { "healthy" } else { "degraded" },
        "records": records.unwrap_or(0),
        "model": analyzer.summarizer().model_name(),
    }))
}

async fn analyze_handler(
    State(state): State<AppState>,
    request: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    // Malformed bodies are invalid input like empty text
    let Json(request) = request.map_err(|e| ApiError::bad_request(e.body_text()))?;
    debug!(chars = request.text.chars().count(), "Analyze request");
    let analysis = state.analyzer.analyze(&request.text).await?;
    Ok(Json(analysis))
}

async fn summaries_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SummaryRecord>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.history_limit)
        .min(MAX_LIST_LIMIT);
    let records = state.analyzer.store().list_recent(limit)?;
    Ok(Json(records))
}

async fn summary_handler(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
) -> Result<Json<SummaryRecord>, ApiError> {
    let fingerprint: Fingerprint = fingerprint
        .parse()
        .map_err(|e| ApiError::bad_request(format!("{}", e)))?;

    state
        .analyzer
        .store()
        .get(&fingerprint)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No summary for {}", fingerprint)))
}

async fn stats_handler(State(state): State<AppState>) -> Result<Json<StoreStats>, ApiError> {
    Ok(Json(state.analyzer.store().stats()?))
}

/// SSE endpoint for live updates
async fn sse_handler(
    State(state): State<AppState>,
) -> axum::response::Sse<
    impl futures::stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    sse::create_sse_stream(state.analyzer.event_bus())
}
