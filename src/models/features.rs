//! Form feature layout
//!
//! The HTML form submits six named fields. Their order here is the column
//! order the burnout and productivity artifacts were trained on.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};

pub const FORM_FEATURE_COUNT: usize = 6;

/// Field names, in model column order
pub const FORM_FIELDS: [&str; FORM_FEATURE_COUNT] = [
    "StressLevel",
    "SleepHours",
    "Workload",
    "ManagerSupport",
    "WorkLifeBalance",
    "PhysicalActivity",
];

/// Bounds the form inputs are clamped to
pub const FIELD_MIN: f32 = 0.0;
pub const FIELD_MAX: f32 = 10.0;

/// Parsed form submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormFeatures {
    pub values: [f32; FORM_FEATURE_COUNT],
}

impl FormFeatures {
    /// Read the six fields in column order
    pub fn from_fields(fields: &HashMap<String, String>) -> AppResult<Self> {
        let mut values = [0.0f32; FORM_FEATURE_COUNT];

        for (slot, name) in values.iter_mut().zip(FORM_FIELDS) {
            let raw = fields
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::MalformedRequest(format!("Missing field: {}", name)))?;

            let value: f32 = raw
                .parse()
                .ok()
                .filter(|v: &f32| v.is_finite())
                .ok_or_else(|| {
                    AppError::MalformedRequest(format!("Invalid value for {}: '{}'", name, raw))
                })?;

            *slot = value.clamp(FIELD_MIN, FIELD_MAX);
        }

        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
