//! Enquiry Chat - web front-end for an intent-detection chatbot
//!
//! Forwards each user message to a Dialogflow agent and renders the reply
//! along with any quick-reply buttons the agent offers.

mod api;
mod config;
mod conversation;
mod intent;
mod runtime;
mod session;

use api::{create_router, AppState};
use config::AppConfig;
use conversation::{IntentTarget, TurnLoop};
use intent::{DialogflowService, LoggingIntentService};
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in deployed environments
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enquiry_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv_result {
        tracing::info!(path = %path.display(), "Loaded .env");
    }

    // Configuration
    let config = AppConfig::from_env()?;

    if config.intent.access_token.is_none() {
        tracing::warn!(
            "DIALOGFLOW_ACCESS_TOKEN is not set; requests to the intent service will be unauthenticated"
        );
    }

    // Initialize intent service
    let dialogflow = DialogflowService::new(&config.intent)?;
    let service = Arc::new(LoggingIntentService::new(Arc::new(dialogflow)));

    tracing::info!(
        project_id = %config.intent.project_id,
        language_code = %config.intent.language_code,
        endpoint = %config.intent.endpoint,
        timeout_secs = config.intent.timeout.as_secs(),
        "Intent service configured"
    );

    let turn_loop = TurnLoop::new(
        service,
        IntentTarget {
            project_id: config.intent.project_id.clone(),
            language_code: config.intent.language_code.clone(),
            timeout: config.intent.timeout,
        },
    );

    // Create application state
    let state = AppState::new(SessionManager::new(Arc::new(turn_loop)));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Enquiry chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
