//! JSON API models

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::inference::ArtifactInfo;

pub const HOME_MESSAGE: &str =
    "Prediction API for burnout (classification) and productivity (regression).";
pub const SUCCESS_MESSAGE: &str = "Prediction performed successfully.";

// ============================================================================
// REQUEST
// ============================================================================

/// Body of `POST /predict/*`
///
/// `features` is either a flat list or a single row (`[[...]]`), which is
/// flattened before validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictRequest {
    #[serde(deserialize_with = "flat_or_single_row")]
    #[validate(
        length(min = 1, max = 256, message = "features must contain between 1 and 256 values"),
        custom(function = "all_finite")
    )]
    pub features: Vec<f32>,
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a list of numbers or a single row of numbers")]
enum FeatureRows {
    Flat(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

fn flat_or_single_row<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    match FeatureRows::deserialize(deserializer)? {
        FeatureRows::Flat(features) => Ok(features),
        FeatureRows::Rows(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
        FeatureRows::Rows(rows) => Err(de::Error::custom(format!(
            "expected a single row of features, got {} rows",
            rows.len()
        ))),
    }
}

// Numbers beyond f32 range deserialize to infinity
fn all_finite(features: &[f32]) -> Result<(), ValidationError> {
    if features.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("features must be finite numbers".into()))
    }
}

impl PredictRequest {
    /// Parse and validate a raw request body
    ///
    /// An absent body and a JSON value that carries no data (`null`, `{}`,
    /// `[]`, `""`, `false`, `0`) are both treated as "no data received".
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::EmptyRequest);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedRequest(format!("body is not valid JSON ({})", e)))?;

        if carries_no_data(&value) {
            return Err(AppError::EmptyRequest);
        }
        if !value.is_object() {
            return Err(AppError::MalformedRequest(
                "expected a JSON object with a 'features' array".to_string(),
            ));
        }

        let request: PredictRequest =
            serde_json::from_value(value).map_err(|e| AppError::MalformedRequest(e.to_string()))?;
        request
            .validate()
            .map_err(|e| AppError::MalformedRequest(e.to_string()))?;

        Ok(request)
    }
}

fn carries_no_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Scalar prediction: integer label or continuous value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionValue {
    Label(i64),
    Value(f64),
}

/// Envelope shared by every JSON endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionValue>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            prediction: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            prediction: None,
        }
    }

    pub fn prediction(prediction: PredictionValue) -> Self {
        Self {
            prediction: Some(prediction),
            ..Self::ok(SUCCESS_MESSAGE)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: Status,
    pub message: &'static str,
    pub classification_loaded: bool,
    pub regression_loaded: bool,
    pub burnout_loaded: bool,
    pub productivity_loaded: bool,
    pub scaler_loaded: bool,
    /// Every slot the active serve mode depends on is loaded
    pub ready: bool,
    pub version: &'static str,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub status: Status,
    pub message: String,
    pub serve_mode: String,
    pub models: Vec<ArtifactInfo>,
}
