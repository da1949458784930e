//! Inference layer - opaque model artifacts behind a capability trait
//!
//! Artifacts are produced by an external training pipeline. The server only
//! loads them and invokes `predict` / `transform`; it never looks inside.
//!
//! Supported artifact formats:
//! - `.onnx` - ONNX graph executed by ONNX Runtime
//! - `.json` - exported linear model parameters wrapped in a `{"model": ...}` bundle

pub mod bundle;
pub mod loader;
pub mod onnx;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::path::PathBuf;

use ndarray::{Array2, ArrayView2};
use serde::Serialize;
use thiserror::Error;

pub use loader::{ArtifactFormat, ArtifactInfo, ModelRegistry};

// ============================================================================
// MODEL SLOTS
// ============================================================================

/// Role an artifact plays in the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSlot {
    /// JSON API burnout classifier
    Classification,
    /// JSON API productivity regressor
    Regression,
    /// Form burnout classifier
    Burnout,
    /// Form productivity regressor
    Productivity,
    /// Form feature scaler
    Scaler,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 5] = [
        ModelSlot::Classification,
        ModelSlot::Regression,
        ModelSlot::Burnout,
        ModelSlot::Productivity,
        ModelSlot::Scaler,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelSlot::Classification => "classification",
            ModelSlot::Regression => "regression",
            ModelSlot::Burnout => "burnout",
            ModelSlot::Productivity => "productivity",
            ModelSlot::Scaler => "scaler",
        }
    }

    /// Human-readable name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelSlot::Classification => "Classification model",
            ModelSlot::Regression => "Regression model",
            ModelSlot::Burnout => "Burnout model",
            ModelSlot::Productivity => "Productivity model",
            ModelSlot::Scaler => "Scaler",
        }
    }
}

impl fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported artifact format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed artifact: {0}")]
    Malformed(String),

    #[error("{0}")]
    Runtime(String),

    #[error("X has {actual} features, but the model is expecting {expected} features as input")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model does not support {0}")]
    Unsupported(&'static str),

    #[error("model returned no output")]
    EmptyOutput,
}

// ============================================================================
// MODEL CAPABILITY
// ============================================================================

/// Capability interface every loaded artifact satisfies
///
/// Inputs are row-major matrices of shape `(rows, features)`.
pub trait Model: Send + Sync {
    /// One prediction per input row
    fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError>;

    /// Feature transformation (scalers only)
    fn transform(&self, _input: ArrayView2<'_, f32>) -> Result<Array2<f32>, ModelError> {
        Err(ModelError::Unsupported("transform"))
    }

    /// Number of features the artifact declares, if it declares one
    fn expected_features(&self) -> Option<usize> {
        None
    }
}

/// Reshape a flat feature vector into a single-row matrix
pub fn single_row(features: &[f32]) -> Result<Array2<f32>, ModelError> {
    Array2::from_shape_vec((1, features.len()), features.to_vec())
        .map_err(|e| ModelError::Runtime(format!("Array error: {}", e)))
}

/// Reject inputs whose width differs from the declared feature count
pub(crate) fn check_width(expected: Option<usize>, input: &ArrayView2<'_, f32>) -> Result<(), ModelError> {
    match expected {
        Some(expected) if expected != input.ncols() => Err(ModelError::ShapeMismatch {
            expected,
            actual: input.ncols(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_shape() {
        let row = single_row(&[3.0, 7.0, 5.0]).unwrap();
        assert_eq!(row.shape(), &[1, 3]);
        assert_eq!(row[[0, 2]], 5.0);
    }

    #[test]
    fn test_check_width() {
        let row = single_row(&[1.0, 2.0]).unwrap();
        assert!(check_width(None, &row.view()).is_ok());
        assert!(check_width(Some(2), &row.view()).is_ok());

        let err = check_width(Some(6), &row.view()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 6, actual: 2 }));
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(ModelSlot::Classification.to_string(), "classification");
        assert_eq!(ModelSlot::Scaler.display_name(), "Scaler");
        assert_eq!(serde_json::to_value(ModelSlot::Productivity).unwrap(), "productivity");
    }
}
