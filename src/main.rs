//! Advisor Chat - single-session financial assistant
//!
//! Classifies free-text questions into a few intents, replies with text,
//! price charts or plan lists, and simulates a share purchase with timed
//! progress feedback.

mod api;
mod config;
mod conversation;
mod intent;
mod reply;
mod runtime;
mod state_machine;
mod view;

use api::{create_router, AppState};
use config::AppConfig;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();
    tracing::info!(
        port = config.port,
        tick_ms = u64::try_from(config.tick_interval.as_millis()).unwrap_or(u64::MAX),
        progress_step = config.progress_step,
        "Loaded configuration"
    );

    // One in-memory session per process
    let session = runtime::spawn_session(config.workflow_context());
    let state = AppState::new(session);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Advisor chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
