//! Health and model status handlers

use axum::{extract::State, Json};

use crate::inference::ModelSlot;
use crate::models::{HealthResponse, ModelsResponse, Status};
use crate::AppState;

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = &state.registry;

    Json(HealthResponse {
        status: Status::Ok,
        message: "alive",
        classification_loaded: registry.is_loaded(ModelSlot::Classification),
        regression_loaded: registry.is_loaded(ModelSlot::Regression),
        burnout_loaded: registry.is_loaded(ModelSlot::Burnout),
        productivity_loaded: registry.is_loaded(ModelSlot::Productivity),
        scaler_loaded: registry.is_loaded(ModelSlot::Scaler),
        ready: registry.is_ready(state.config.serve_mode.required_slots()),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Load report for every configured artifact
pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state.registry.artifacts().to_vec();

    Json(ModelsResponse {
        status: Status::Ok,
        message: format!("{} artifact(s) configured", models.len()),
        serve_mode: state.config.serve_mode.to_string(),
        models,
    })
}
