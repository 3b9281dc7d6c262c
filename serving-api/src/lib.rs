//! Banknote Authentication API
//!
//! Serves a pre-fitted scaler + binary classifier that tells authentic
//! banknotes (class 1) from counterfeits (class 0) using six geometric
//! measurements.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    BANKNOTE API                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │  Router   │──▶│  Ingest      │──▶│  ModelBundle    │  │
//! │  │  (Axum)   │   │  CSV / JSON  │   │  scale+predict  │  │
//! │  └───────────┘   └──────────────┘   └────────┬────────┘  │
//! │                                              ▼           │
//! │                              scaler.json  classifier.json│
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod ingest;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use inference::ModelBundle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<ModelBundle>,
    pub config: Config,
}

impl AppState {
    pub fn new(models: ModelBundle, config: Config) -> Self {
        Self {
            models: Arc::new(models),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .route("/model_info", get(handlers::model_info::get))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_file", post(handlers::predict::predict_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
