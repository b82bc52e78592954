//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::search::SummaryResponse;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `POST /search_summarize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Root handler
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the RAG Model API. Use /search_summarize to submit queries."
    }))
}

/// Search, fetch and summarize the top results for a query
pub async fn search_summarize(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let response = state.orchestrator.process(&request.query).await?;
    Ok(Json(response))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Pipeline counters and configuration summary
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "started_at": state.started_at.to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "search_engine": state.settings.search.engine,
        "model": state.settings.summarizer.model,
        "result_count": state.orchestrator.options().result_count,
        "metrics": state.metrics.snapshot(),
    }))
}
