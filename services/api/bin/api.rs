//! Main Entrypoint for the Mock Interview API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the session store, chat provider and interviewer.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use interviewer_api::{config::Config, router::create_router, state::AppState};
use interviewer_core::{
    interviewer::Interviewer,
    llm_client::{ChatProvider, OpenAICompatibleClient},
    session_store::SessionStore,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let sessions = Arc::new(SessionStore::new(config.session_max_turns));
    if let Some(ttl) = config.session_idle_ttl {
        sessions.spawn_idle_sweeper(ttl);
        info!(ttl_secs = ttl.as_secs(), "Idle session sweeper started.");
    }

    let provider: Option<Arc<dyn ChatProvider>> = match &config.groq_api_key {
        Some(api_key) => {
            info!(api_base = %config.groq_api_base, "Using OpenAI-compatible chat provider.");
            Some(Arc::new(OpenAICompatibleClient::new(
                config.groq_api_base.clone(),
                api_key.clone(),
            )))
        }
        None => {
            warn!("GROQ_API_KEY is not set. Chat requests will receive a setup notice.");
            None
        }
    };

    let interviewer = Arc::new(Interviewer::new(
        provider,
        sessions,
        config.default_model.clone(),
    ));
    let default_model = interviewer.resolve_model(None);
    let app_state = Arc::new(AppState { interviewer });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %default_model,
        max_turns = config.session_max_turns,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
