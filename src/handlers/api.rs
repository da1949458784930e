//! JSON API handlers

use axum::{body::Bytes, extract::State, http::Uri, Json};

use crate::inference::ModelSlot;
use crate::models::{ApiResponse, PredictRequest, PredictionValue, HOME_MESSAGE};
use crate::service;
use crate::{AppError, AppResult, AppState};

pub async fn home() -> Json<ApiResponse> {
    Json(ApiResponse::ok(HOME_MESSAGE))
}

/// Burnout risk class
pub async fn predict_classification(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse>> {
    let model = service::require(&state.registry, ModelSlot::Classification)?;
    let request = PredictRequest::from_body(&body)?;

    let label = service::run_blocking(move || service::classify(model.as_ref(), &request.features)).await?;
    tracing::debug!("Classification prediction: {}", label);

    Ok(Json(ApiResponse::prediction(PredictionValue::Label(label))))
}

/// Productivity level
pub async fn predict_regression(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse>> {
    let model = service::require(&state.registry, ModelSlot::Regression)?;
    let request = PredictRequest::from_body(&body)?;

    let value = service::run_blocking(move || service::regress(model.as_ref(), &request.features)).await?;
    tracing::debug!("Regression prediction: {}", value);

    Ok(Json(ApiResponse::prediction(PredictionValue::Value(value))))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServeMode;
    use crate::inference::testing::{FailingModel, FixedModel, SumModel};
    use crate::inference::{ModelRegistry, ModelSlot};
    use crate::models::SUCCESS_MESSAGE;
    use crate::{create_router, test_state};

    fn app(registry: ModelRegistry) -> Router {
        create_router(test_state(ServeMode::Api, registry))
    }

    fn loaded() -> ModelRegistry {
        ModelRegistry::empty()
            .with_model(ModelSlot::Classification, Arc::new(FixedModel::new(vec![1.0])))
            .with_model(ModelSlot::Regression, Arc::new(SumModel))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let (status, body) = send(app(loaded()), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["message"].as_str().unwrap().contains("burnout"));
    }

    #[tokio::test]
    async fn test_classification_success() {
        let (status, body) = send(
            app(loaded()),
            post("/predict/classification", r#"{"features": [3, 7, 5, 2, 6, 1]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "message": SUCCESS_MESSAGE, "prediction": 1}));
        assert!(body["prediction"].is_i64());
    }

    #[tokio::test]
    async fn test_regression_success_is_float() {
        let (status, body) = send(
            app(loaded()),
            post("/predict/regression", r#"{"features": [3, 7, 5, 2, 6, 1]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["prediction"].is_f64());
        assert_eq!(body["prediction"].as_f64(), Some(24.0));
    }

    #[tokio::test]
    async fn test_single_row_features() {
        let (status, body) = send(
            app(loaded()),
            post("/predict/regression", r#"{"features": [[3, 7, 5, 2, 6, 1]]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"].as_f64(), Some(24.0));
    }

    #[tokio::test]
    async fn test_out_of_range_feature_never_reaches_model() {
        let classifier = Arc::new(FixedModel::new(vec![1.0]));
        let registry = ModelRegistry::empty().with_model(ModelSlot::Classification, classifier.clone());

        let (status, body) = send(
            app(registry),
            post("/predict/classification", r#"{"features": [1e39, 2]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request"));
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_features_key() {
        for uri in ["/predict/classification", "/predict/regression"] {
            let (status, body) = send(app(loaded()), post(uri, "{}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"status": "error", "message": "No data received."}));

            let (status, body) = send(app(loaded()), post(uri, r#"{"values": [1]}"#)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "error");
        }
    }

    #[tokio::test]
    async fn test_absent_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict/classification")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(loaded()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No data received.");
    }

    #[tokio::test]
    async fn test_unloaded_model_is_not_invoked() {
        let regressor = Arc::new(FixedModel::new(vec![4.2]));
        let registry = ModelRegistry::empty().with_model(ModelSlot::Regression, regressor.clone());

        let (status, body) = send(
            app(registry),
            post("/predict/classification", r#"{"features": [3, 7, 5, 2, 6, 1]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Classification model not loaded.");
        assert_eq!(regressor.calls(), 0);
    }

    #[tokio::test]
    async fn test_unloaded_model_checked_before_body() {
        let (status, body) = send(app(ModelRegistry::empty()), post("/predict/regression", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Regression model not loaded.");
    }

    #[tokio::test]
    async fn test_model_failure_is_an_error_envelope() {
        let registry = ModelRegistry::empty()
            .with_model(ModelSlot::Classification, Arc::new(FailingModel { expected: 6 }));
        let (status, body) = send(
            app(registry),
            post("/predict/classification", r#"{"features": [1, 2]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Error performing prediction:"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (status, body) = send(app(loaded()), post("/predict/regression", "{features: [1]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = send(app(loaded()), get("/predict/clustering")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_health_reflects_registry() {
        let registry = ModelRegistry::empty().with_model(ModelSlot::Classification, Arc::new(SumModel));
        let (status, body) = send(app(registry), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "alive");
        assert_eq!(body["classification_loaded"], true);
        assert_eq!(body["regression_loaded"], false);
        assert_eq!(body["ready"], false);

        let (_, body) = send(app(loaded()), get("/health")).await;
        assert_eq!(body["regression_loaded"], true);
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn test_models_listing() {
        let (status, body) = send(app(loaded()), get("/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serve_mode"], "api");
        assert_eq!(body["models"].as_array().map(Vec::len), Some(2));
    }
}
