//! JSON artifact bundles
//!
//! Exported parameters of linear-family estimators, wrapped together with
//! optional metadata:
//!
//! ```json
//! {
//!   "model": { "kind": "linear_regression", "coefficients": [0.4, -0.2], "intercept": 1.5 },
//!   "metadata": { "feature_names": ["StressLevel", "SleepHours"], "version": "2024-05" }
//! }
//! ```

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{check_width, Model, ModelError};

/// Auxiliary information shipped next to the estimator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Estimator parameters, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LinearRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// One coefficient row per class, or a single row for binary problems
    LogisticRegression {
        coefficients: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        classes: Vec<i64>,
    },
    StandardScaler {
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

#[derive(Debug, Deserialize)]
struct RawBundle {
    model: Estimator,
    #[serde(default)]
    metadata: ArtifactMetadata,
}

/// A validated JSON bundle, ready for inference
#[derive(Debug, Clone)]
pub struct JsonBundle {
    estimator: Estimator,
    metadata: ArtifactMetadata,
    width: usize,
}

impl JsonBundle {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let raw: RawBundle = serde_json::from_slice(bytes)
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        let width = raw.model.validate()?;
        if let Some(names) = &raw.metadata.feature_names {
            if names.len() != width {
                return Err(ModelError::Malformed(format!(
                    "metadata lists {} feature names but the estimator has {} inputs",
                    names.len(),
                    width
                )));
            }
        }

        Ok(Self {
            estimator: raw.model,
            metadata: raw.metadata,
            width,
        })
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}

impl Estimator {
    /// Check parameter shapes; returns the input width
    fn validate(&self) -> Result<usize, ModelError> {
        let width = match self {
            Estimator::LinearRegression { coefficients, .. } => coefficients.len(),
            Estimator::LogisticRegression { coefficients, intercept, classes } => {
                let width = coefficients.first().map(Vec::len).unwrap_or(0);
                if coefficients.iter().any(|row| row.len() != width) {
                    return Err(ModelError::Malformed("ragged coefficient matrix".to_string()));
                }
                if intercept.len() != coefficients.len() {
                    return Err(ModelError::Malformed(format!(
                        "{} intercepts for {} coefficient rows",
                        intercept.len(),
                        coefficients.len()
                    )));
                }
                let binary = coefficients.len() == 1 && classes.len() == 2;
                if !binary && classes.len() != coefficients.len() {
                    return Err(ModelError::Malformed(format!(
                        "{} classes for {} coefficient rows",
                        classes.len(),
                        coefficients.len()
                    )));
                }
                if classes.len() < 2 {
                    return Err(ModelError::Malformed("at least two classes are required".to_string()));
                }
                width
            }
            Estimator::StandardScaler { mean, scale } => {
                if mean.len() != scale.len() {
                    return Err(ModelError::Malformed(format!(
                        "scaler has {} means and {} scales",
                        mean.len(),
                        scale.len()
                    )));
                }
                mean.len()
            }
        };

        if width == 0 {
            return Err(ModelError::Malformed("estimator has no inputs".to_string()));
        }
        Ok(width)
    }
}

fn dot(weights: &[f64], row: ArrayView1<'_, f32>) -> f64 {
    weights.iter().zip(row.iter()).map(|(w, x)| w * f64::from(*x)).sum()
}

impl Model for JsonBundle {
    fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        check_width(Some(self.width), &input)?;

        match &self.estimator {
            Estimator::LinearRegression { coefficients, intercept } => Ok(input
                .rows()
                .into_iter()
                .map(|row| dot(coefficients, row) + intercept)
                .collect()),

            Estimator::LogisticRegression { coefficients, intercept, classes } => Ok(input
                .rows()
                .into_iter()
                .map(|row| {
                    if coefficients.len() == 1 {
                        let score = dot(&coefficients[0], row) + intercept[0];
                        let idx = usize::from(score > 0.0);
                        classes[idx] as f64
                    } else {
                        let mut best = (0, f64::NEG_INFINITY);
                        for (i, (weights, bias)) in coefficients.iter().zip(intercept).enumerate() {
                            let score = dot(weights, row) + bias;
                            if score > best.1 {
                                best = (i, score);
                            }
                        }
                        classes[best.0] as f64
                    }
                })
                .collect()),

            Estimator::StandardScaler { .. } => Err(ModelError::Unsupported("predict")),
        }
    }

    fn transform(&self, input: ArrayView2<'_, f32>) -> Result<Array2<f32>, ModelError> {
        check_width(Some(self.width), &input)?;

        match &self.estimator {
            Estimator::StandardScaler { mean, scale } => {
                let mut out = input.to_owned();
                for mut row in out.rows_mut() {
                    for (j, value) in row.iter_mut().enumerate() {
                        // zero-variance features keep unit scale
                        let s = if scale[j] == 0.0 { 1.0 } else { scale[j] };
                        *value = ((f64::from(*value) - mean[j]) / s) as f32;
                    }
                }
                Ok(out)
            }
            _ => Err(ModelError::Unsupported("transform")),
        }
    }

    fn expected_features(&self) -> Option<usize> {
        Some(self.width)
    }
}
