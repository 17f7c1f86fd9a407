//! HTTP daemon serving command generation.
//!
//! Endpoints:
//! - `GET /health`: provider/model status
//! - `POST /complete`: `{prompt, cwd?, shell?, os?, user?}` → generation result
//!
//! Every error response is `{"error": "<message>"}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::config::Preferences;
use crate::core::Orchestrator;
use crate::domain::{CommandContext, GenerationResult};
use crate::error::GenerationError;

/// Shared handler state; the orchestrator is built once and injected here
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub preferences: Preferences,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, preferences: Preferences) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            preferences,
        }
    }
}

/// Body of `POST /complete`
#[derive(Debug, Deserialize)]
struct CompleteRequest {
    /// Outer `None` when the key is absent, inner `None` when it is null
    #[serde(default, deserialize_with = "present")]
    prompt: Option<Option<String>>,
    #[serde(flatten)]
    context: CommandContext,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
    pub connected: bool,
}

/// Error response carrying a status code and message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Failed to generate command: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the router with CORS and request tracing
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/complete", post(complete))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "Starting shell assistant daemon");
    info!(
        provider = state.orchestrator.provider_id(),
        model = state.orchestrator.model(),
        "Using backend"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Bind `host:port` and serve
pub async fn run(host: &str, port: u16, state: AppState) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: state.orchestrator.provider_id().to_string(),
        model: state.orchestrator.model().to_string(),
        connected: true,
    })
}

async fn complete(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerationResult>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Empty request body"));
    }

    let request: CompleteRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

    let prompt = request
        .prompt
        .ok_or_else(|| ApiError::bad_request("Missing required field: prompt"))?
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt cannot be empty"))?;

    let context = state.preferences.context_aware.then_some(request.context);

    let span = tracing::info_span!("complete", request_id = %Uuid::new_v4());
    let result = state
        .orchestrator
        .generate(&prompt, context)
        .instrument(span)
        .await
        .map_err(|e| {
            error!("Error generating command: {}", e);
            ApiError::from(e)
        })?;

    if state.preferences.explain_commands {
        Ok(Json(result))
    } else {
        Ok(Json(result.without_explanation()))
    }
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "Not found".to_string(),
    }
}
