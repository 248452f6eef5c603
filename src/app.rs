use std::sync::Arc;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::genai::{ChatModel, GeminiClient};
use crate::routes::create_routes;

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rs_chat_relay=info,tower_http=debug,axum::rejection=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> Router {
    info!("Initializing application router");

    let model: Arc<dyn ChatModel> = Arc::new(GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
    ));

    create_app_with_model(model)
}

/// Assemble the router around any [`ChatModel`] implementation.
/// Tests inject a scripted model through the same path production uses.
pub fn create_app_with_model(model: Arc<dyn ChatModel>) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(Extension(model)) // Shared upstream client handle
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
