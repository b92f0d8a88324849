//! HTTP routes for the debate API.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use debatearena_core::{
    AudioFormat, DebateOrchestrator, DebateRequest, Speaker, StageError, SynthesizedTurn, Voice,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub orchestrator: DebateOrchestrator,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub speaker: Speaker,
    pub text: String,
    pub audio_format: AudioFormat,
    pub audio_base64: String,
}

impl From<SynthesizedTurn> for TurnResponse {
    fn from(turn: SynthesizedTurn) -> Self {
        Self {
            speaker: turn.speaker,
            text: turn.text,
            audio_format: turn.audio.format,
            audio_base64: STANDARD.encode(&turn.audio.bytes),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebateResponse {
    pub topic: String,
    pub turns: Vec<TurnResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}

pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    tracing::info!("Creating API router with endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/voices");
    tracing::info!("  POST /api/debate");

    Router::new()
        .route("/health", get(health))
        .route("/api/voices", get(voices))
        .route("/api/debate", post(debate))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Wildcards are not allowed alongside credentials, so mirror the request.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn health() -> Json<HealthResponse> {
    tracing::debug!("Health check endpoint called");
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn voices(State(state): State<Arc<AppState>>) -> Result<Json<VoicesResponse>, ApiError> {
    let voices = state.orchestrator.voices().await?;
    tracing::debug!("Found {} voices", voices.len());
    Ok(Json(VoicesResponse { voices }))
}

async fn debate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DebateRequest>, JsonRejection>,
) -> Result<Json<DebateResponse>, ApiError> {
    let Json(payload) = payload?;
    tracing::info!(
        "Generating {}-turn debate on '{}' ({} vs {})",
        payload.turns,
        payload.topic,
        payload.persona_a,
        payload.persona_b
    );

    let outcome = state.orchestrator.run(&payload).await?;

    Ok(Json(DebateResponse {
        topic: outcome.topic,
        turns: outcome.turns.into_iter().map(TurnResponse::from).collect(),
    }))
}

// Error handling
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Upstream(String),
}

impl From<StageError> for ApiError {
    fn from(err: StageError) -> Self {
        if err.is_invalid_request() {
            ApiError::InvalidRequest(err.source.to_string())
        } else {
            tracing::error!("{}", err);
            ApiError::Upstream(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected debate body: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "detail": detail
        }));

        (status, body).into_response()
    }
}
