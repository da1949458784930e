//! ONNX Runtime backed artifacts
//!
//! Estimators exported with skl2onnx / onnxmltools take a single float
//! tensor of shape `(rows, features)`. The first graph output carries the
//! result: int64 labels for classifiers, float values for regressors and a
//! transformed matrix for scalers.

use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;

use super::{Model, ModelError};

/// Loaded ONNX session
///
/// `Session::run` needs `&mut self`, so the session sits behind a mutex. The
/// lock is held for the duration of one inference call only.
pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxModel {
    /// Load ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(|e| ModelError::Runtime(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Runtime(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Malformed(format!("Load from memory error: {}", e)))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, ModelError> {
        if session.inputs().is_empty() {
            return Err(ModelError::Malformed("No input defined".to_string()));
        }
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ModelError::Malformed("No output defined".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }

    /// Run the graph and return the first output, flattened
    fn run(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        let tensor = Tensor::from_array(input.to_owned())
            .map_err(|e| ModelError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ModelError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name).ok_or(ModelError::EmptyOutput)?;

        // Labels come out as int64, regressors and scalers as float
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return Ok(data.iter().map(|v| *v as f64).collect());
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|v| f64::from(*v)).collect());
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f64>() {
            return Ok(data.to_vec());
        }
        if let Ok((_, data)) = output.try_extract_tensor::<i32>() {
            return Ok(data.iter().map(|v| f64::from(*v)).collect());
        }

        Err(ModelError::Runtime(format!(
            "Output '{}' is not a numeric tensor",
            self.output_name
        )))
    }
}

impl Model for OnnxModel {
    fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Vec<f64>, ModelError> {
        let values = self.run(input)?;
        if values.is_empty() {
            return Err(ModelError::EmptyOutput);
        }
        Ok(values)
    }

    fn transform(&self, input: ArrayView2<'_, f32>) -> Result<Array2<f32>, ModelError> {
        let rows = input.nrows().max(1);
        let values = self.run(input)?;
        if values.is_empty() || values.len() % rows != 0 {
            return Err(ModelError::Runtime(format!(
                "Cannot reshape {} output values into {} rows",
                values.len(),
                rows
            )));
        }

        let cols = values.len() / rows;
        Array2::from_shape_vec((rows, cols), values.into_iter().map(|v| v as f32).collect())
            .map_err(|e| ModelError::Runtime(format!("Array error: {}", e)))
    }
}
