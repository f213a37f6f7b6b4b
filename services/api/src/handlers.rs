//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for the mock
//! interview. It uses `utoipa` doc comments to generate OpenAPI documentation.
//!
//! Request bodies are read as raw bytes and parsed leniently: a missing or
//! malformed body is treated as an empty object rather than rejected. A query
//! string that does not deserialize is ignored the same way.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use interviewer_core::{catalog::ModelCatalog, interviewer::ChatOutcome};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use crate::{
    models::{ChatPayload, ChatResponse, HealthResponse, ModelQuery, ResetPayload, ResetResponse},
    state::AppState,
};

fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        warn!(error = %err, "Ignoring unparseable request body");
        T::default()
    })
}

/// Run one interview turn.
#[utoipa::path(
    post,
    path = "/interview/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Interviewer reply, or a setup notice when no provider is configured", body = ChatResponse),
        (status = 500, description = "The chat provider failed; a canned reply is included", body = ChatResponse)
    ),
    params(
        ("model" = Option<String>, Query, description = "Model override used when the body names none")
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ModelQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_else(|rejection| {
        warn!(error = %rejection, "Ignoring unparseable query string");
        ModelQuery::default()
    });
    let payload: ChatPayload = parse_body(&body);
    let outcome = state
        .interviewer
        .chat(payload.into_input(query.model))
        .await;

    match outcome {
        ChatOutcome::Reply { message, model } | ChatOutcome::Unconfigured { message, model } => (
            StatusCode::OK,
            Json(ChatResponse {
                messages: vec![message],
                model: Some(model),
                error: None,
            }),
        )
            .into_response(),
        ChatOutcome::ProviderFailed { message, error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse {
                messages: vec![message],
                model: None,
                error: Some(error),
            }),
        )
            .into_response(),
    }
}

/// List the models the interviewer can use.
#[utoipa::path(
    get,
    path = "/interview/models",
    responses(
        (status = 200, description = "Static model catalog", body = ModelCatalog)
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelCatalog> {
    Json(state.interviewer.list_models())
}

/// Forget a session's transcript.
#[utoipa::path(
    post,
    path = "/interview/reset",
    request_body = ResetPayload,
    responses(
        (status = 200, description = "Session reset (always succeeds)", body = ResetResponse)
    )
)]
pub async fn reset_session(State(state): State<Arc<AppState>>, body: Bytes) -> Json<ResetResponse> {
    let payload: ResetPayload = parse_body(&body);
    let session_id = state
        .interviewer
        .reset_session(payload.session_id.as_deref())
        .await;

    Json(ResetResponse {
        success: true,
        message: format!("Interview session '{}' has been reset.", session_id),
    })
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider_configured: state.interviewer.is_configured(),
        sessions: state.interviewer.sessions().len().await,
    })
}
