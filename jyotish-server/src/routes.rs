//! HTTP surface: health check, retrieval-augmented chat, and static chart
//! interpretation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use jyotish_rag::{SearchResult, Tag};

use crate::interpret::{interpret_chart, ChartRequest, ChartResponse};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/chat/rag", post(rag_chat))
        .route("/chart/interpret", post(chart_interpret))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "jyotish-rag" }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct RetrievedChunk {
    id: String,
    score: f32,
    text: String,
    meta: Tag,
}

impl From<SearchResult> for RetrievedChunk {
    fn from(result: SearchResult) -> Self {
        Self { id: result.id, score: result.score, text: result.text, meta: result.tag }
    }
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    answer: String,
    retrieved_context_preview: Vec<RetrievedChunk>,
}

/// Internal failures surface as an opaque 500; the cause goes to the log.
struct PipelineFailure;

impl IntoResponse for PipelineFailure {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "RAG pipeline failure" })))
            .into_response()
    }
}

async fn rag_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, PipelineFailure> {
    let answered = state.pipeline.answer(&body.query).await.map_err(|e| {
        error!(error = %e, "rag query failed");
        PipelineFailure
    })?;

    Ok(Json(ChatResponse {
        answer: answered.answer,
        retrieved_context_preview: answered.evidence.into_iter().map(Into::into).collect(),
    }))
}

async fn chart_interpret(
    State(state): State<AppState>,
    Json(body): Json<ChartRequest>,
) -> Json<ChartResponse> {
    Json(interpret_chart(body, &state.house_lords))
}
