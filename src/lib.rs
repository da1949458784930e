//! MindTrack prediction server
//!
//! Serves two pre-trained models, a burnout-risk classifier and a
//! productivity regressor, over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MINDTRACK SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐              ┌──────────────────────────┐ │
//! │  │  JSON API    │              │  HTML form               │ │
//! │  │  /predict/*  │              │  /predict (form mode)    │ │
//! │  └──────┬───────┘              └────────────┬─────────────┘ │
//! │         └──────────────┬────────────────────┘               │
//! │                        ▼                                    │
//! │              ┌───────────────────┐                          │
//! │              │ Prediction service│                          │
//! │              └─────────┬─────────┘                          │
//! │                        ▼                                    │
//! │              ┌───────────────────┐                          │
//! │              │  Model registry   │  ONNX / JSON artifacts   │
//! │              └───────────────────┘  loaded once at startup  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod service;
pub mod views;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use config::Config;
use inference::ModelRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: Config,
}

/// Create the main router for the configured serve mode
pub fn create_router(state: AppState) -> Router {
    let mode = state.config.serve_mode;

    // Always available
    let mut router: Router<AppState> = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/models", get(handlers::health::models));

    if mode.serves_api() {
        router = router
            .route("/", get(handlers::api::home))
            .route("/predict/classification", post(handlers::api::predict_classification))
            .route("/predict/regression", post(handlers::api::predict_regression));
    }

    if mode.serves_form() {
        let paths = handlers::form::paths(mode);
        router = router
            .route(paths.index, get(handlers::form::index))
            .route(paths.action, post(handlers::form::predict))
            .route("/static/script.js", get(handlers::form::script));
    }

    router
        .fallback(handlers::api::not_found)
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

#[cfg(test)]
pub(crate) fn test_state(mode: config::ServeMode, registry: ModelRegistry) -> AppState {
    let mut config = Config::from_lookup(|_| None);
    config.serve_mode = mode;
    AppState {
        registry: Arc::new(registry),
        config,
    }
}
