//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::inference::{ModelError, ModelSlot};
use crate::models::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Model errors
    #[error("{} not loaded.", .0.display_name())]
    ModelUnavailable(ModelSlot),

    // Request errors
    #[error("No data received.")]
    EmptyRequest,

    #[error("Invalid request: {0}")]
    MalformedRequest(String),

    // Inference errors
    #[error("Error performing prediction: {0}")]
    PredictionFailed(String),

    // Routing errors
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::PredictionFailed(msg) => tracing::warn!("Prediction failed: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::ModelUnavailable(slot) => tracing::warn!("Request for unloaded {} model", slot),
            _ => {}
        }

        let status = self.status_code();
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::PredictionFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Inference task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::ModelUnavailable(ModelSlot::Classification).to_string(),
            "Classification model not loaded."
        );
        assert_eq!(AppError::ModelUnavailable(ModelSlot::Scaler).to_string(), "Scaler not loaded.");
        assert_eq!(AppError::EmptyRequest.to_string(), "No data received.");
    }

    #[test]
    fn test_model_errors_become_prediction_failures() {
        let err: AppError = ModelError::ShapeMismatch { expected: 6, actual: 3 }.into();
        assert!(matches!(err, AppError::PredictionFailed(_)));
        assert!(err.to_string().starts_with("Error performing prediction: X has 3 features"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::EmptyRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ModelUnavailable(ModelSlot::Regression).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PredictionFailed("boom".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("/nope".into()).status_code(), StatusCode::NOT_FOUND);
    }
}
