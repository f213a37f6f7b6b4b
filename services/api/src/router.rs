//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the interview REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{ChatPayload, ChatResponse, HealthResponse, ResetPayload, ResetResponse},
    state::AppState,
};
use interviewer_core::{
    catalog::{ModelCatalog, ModelInfo},
    interviewer::{Animation, FacialExpression, ReplyMessage},
    viseme::{LipSync, LipSyncMetadata, MouthCue},
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat,
        handlers::list_models,
        handlers::reset_session,
        handlers::health,
    ),
    components(
        schemas(
            ChatPayload, ChatResponse, ResetPayload, ResetResponse, HealthResponse,
            ReplyMessage, FacialExpression, Animation, LipSync, LipSyncMetadata, MouthCue,
            ModelCatalog, ModelInfo
        )
    ),
    tags(
        (name = "Mock Interview API", description = "AI interviewer chat with avatar presentation hints")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/interview/chat", post(handlers::chat))
        .route("/interview/models", get(handlers::list_models))
        .route("/interview/reset", post(handlers::reset_session))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
