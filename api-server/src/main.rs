//! Student Retention Prediction API
//!
//! HTTP front for the risk inference core.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    RETENTION API                         │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────┐    │
//! │  │  Router   │──▶│  PredictionService               │    │
//! │  │  (Axum)   │   │  features → forest → tier → why  │    │
//! │  └───────────┘   └────────────────┬─────────────────┘    │
//! │                                   ▼                      │
//! │                           ┌──────────────┐               │
//! │                           │  ModelSlot   │               │
//! │                           └──────────────┘               │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use state::AppState;

const DEFAULT_LOG_FILTER: &str = "retention_api=debug,retention_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        "Student Retention API v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    if config.is_production() && config.model_path.is_none() {
        tracing::warn!("Production environment without a trained model artifact");
    }

    let addr = config.bind_address();
    let state = AppState::build(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);
    for endpoint in handlers::health::ENDPOINTS {
        tracing::info!("  {}", endpoint);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::check))
        .route("/api/predict/student", post(handlers::predict::student))
        .route("/api/predict/batch", post(handlers::predict::batch))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
