//! Prediction service - feature vector in, typed prediction out
//!
//! Both presentation adapters go through here. Availability is checked by
//! the caller (via [`require`]) before the request body is even parsed, so
//! an unloaded model never sees a request.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::inference::{single_row, Model, ModelRegistry, ModelSlot};

/// Result shown on the form page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Raw label returned by the burnout classifier
    pub burnout_risk: f64,
    /// Productivity estimate rounded to two decimals
    pub productivity: f64,
}

/// Handles needed by the form adapter
pub struct FormModels {
    pub burnout: Arc<dyn Model>,
    pub productivity: Arc<dyn Model>,
    pub scaler: Arc<dyn Model>,
}

/// Fetch a model or fail with `ModelUnavailable`
pub fn require(registry: &ModelRegistry, slot: ModelSlot) -> AppResult<Arc<dyn Model>> {
    registry.get(slot).ok_or(AppError::ModelUnavailable(slot))
}

pub fn require_form_models(registry: &ModelRegistry) -> AppResult<FormModels> {
    Ok(FormModels {
        burnout: require(registry, ModelSlot::Burnout)?,
        productivity: require(registry, ModelSlot::Productivity)?,
        scaler: require(registry, ModelSlot::Scaler)?,
    })
}

/// First element of a prediction, as returned by the model
fn first_output(model: &dyn Model, features: &[f32]) -> AppResult<f64> {
    let input = single_row(features)?;
    let output = model.predict(input.view())?;
    output
        .first()
        .copied()
        .ok_or_else(|| AppError::PredictionFailed("model returned no output".to_string()))
}

/// Integer class label
pub fn classify(model: &dyn Model, features: &[f32]) -> AppResult<i64> {
    let raw = first_output(model, features)?;
    to_label(raw)
}

/// Continuous value
pub fn regress(model: &dyn Model, features: &[f32]) -> AppResult<f64> {
    let raw = first_output(model, features)?;
    if !raw.is_finite() {
        return Err(AppError::PredictionFailed(format!("model returned a non-finite value ({})", raw)));
    }
    Ok(raw)
}

/// Burnout label plus scaled, rounded productivity for one form submission
pub fn assess(models: &FormModels, features: &[f32]) -> AppResult<Assessment> {
    let burnout_risk = first_output(models.burnout.as_ref(), features)?;

    let scaled = models.scaler.transform(single_row(features)?.view())?;
    let scaled = scaled.row(0).to_vec();
    let productivity = regress(models.productivity.as_ref(), &scaled)?;

    Ok(Assessment {
        burnout_risk,
        productivity: round_to(productivity, 2),
    })
}

/// Truncate toward zero, as an integer cast of the raw label would
pub fn to_label(value: f64) -> AppResult<i64> {
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(AppError::PredictionFailed(format!(
            "cannot convert {} to an integer label",
            value
        )));
    }
    Ok(value.trunc() as i64)
}

/// Round to `decimals` places from the exact binary value, ties to even
///
/// Formatting is exact, so `round_to(2.675, 2)` is 2.67: the stored double
/// sits just below 2.675.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Run blocking inference off the async executor
pub async fn run_blocking<T, F>(job: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await?
}

/// Display form of a raw label: integral values without a fraction
pub fn format_label(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
