//! Stub models for tests

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array2, ArrayView2};

use super::{Model, ModelError};

/// Returns the same outputs for every call and counts invocations
pub struct FixedModel {
    outputs: Vec<f64>,
    calls: AtomicUsize,
}

impl FixedModel {
    pub fn new(outputs: Vec<f64>) -> Self {
        Self {
            outputs,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Model for FixedModel {
    fn predict(&self, _input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outputs.clone())
    }
}

/// Sums each row; useful to observe what the model was fed
pub struct SumModel;

impl Model for SumModel {
    fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        Ok(input.rows().into_iter().map(|row| row.iter().map(|v| f64::from(*v)).sum::<f64>()).collect())
    }
}

/// Multiplies every feature by a constant
pub struct ScaleBy(pub f32);

impl Model for ScaleBy {
    fn predict(&self, _input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::Unsupported("predict"))
    }

    fn transform(&self, input: ArrayView2<'_, f32>) -> Result<Array2<f32>, ModelError> {
        Ok(input.mapv(|v| v * self.0))
    }
}

/// Always fails with a shape mismatch against `expected` features
pub struct FailingModel {
    pub expected: usize,
}

impl Model for FailingModel {
    fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::ShapeMismatch {
            expected: self.expected,
            actual: input.ncols(),
        })
    }
}
