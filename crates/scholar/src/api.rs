use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use scholar_core::ResearchResult;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::orchestrator::Orchestrator;

/// What the HTTP layer needs from whatever answers questions.
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    async fn process_query(&self, question: &str) -> ResearchResult;
    fn agents_available(&self) -> bool;
    fn tools_available(&self) -> bool;
}

#[async_trait::async_trait]
impl QueryService for Orchestrator {
    async fn process_query(&self, question: &str) -> ResearchResult {
        Orchestrator::process_query(self, question).await
    }

    fn agents_available(&self) -> bool {
        Orchestrator::agents_available(self)
    }

    fn tools_available(&self) -> bool {
        Orchestrator::tools_available(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Question cannot be empty")]
    EmptyQuestion,
    #[error("Processing error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyQuestion => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<dyn QueryService>,
}

pub fn router(orchestrator: Arc<dyn QueryService>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/ask", post(ask))
        .with_state(AppState { orchestrator })
}

/// CORS for the browser frontend. `*` allows any origin; invalid origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);
    if origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = if state.orchestrator.agents_available() {
        "CrewAI Multi-Agent System Active"
    } else {
        "Fallback Mode"
    };
    Json(serde_json::json!({
        "message": "Research & Reason Assistant API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "agents": agents,
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let o = &state.orchestrator;
    Json(serde_json::json!({
        "status": "healthy",
        "agents": if o.agents_available() { "operational" } else { "fallback" },
        "tools": if o.tools_available() { "mcp_active" } else { "mock" },
    }))
}

#[tracing::instrument(skip_all, fields(question_chars = tracing::field::Empty))]
async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<ResearchResult>, ApiError> {
    if req.question.trim().is_empty() {
        return Err(ApiError::EmptyQuestion);
    }
    tracing::Span::current().record("question_chars", req.question.chars().count() as u64);
    tracing::info!("ask received");

    // A panic here would otherwise drop the connection instead of answering 500.
    let orchestrator = state.orchestrator.clone();
    let question = req.question;
    let result = tokio::spawn(async move { orchestrator.process_query(&question).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(result))
}
