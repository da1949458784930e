//! HTML form handlers
//!
//! Every response is the same page with HTTP 200; failures are shown on the
//! page instead of being signalled through the status code.

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    http::header,
    response::{Html, IntoResponse},
    Form,
};

use crate::config::ServeMode;
use crate::models::FormFeatures;
use crate::service::{self, Assessment};
use crate::views::{render_form, Outcome};
use crate::{AppError, AppResult, AppState};

const SCRIPT: &str = include_str!("../../static/script.js");

/// Where the form is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormPaths {
    pub index: &'static str,
    pub action: &'static str,
}

pub fn paths(mode: ServeMode) -> FormPaths {
    match mode {
        ServeMode::Form => FormPaths {
            index: "/",
            action: "/predict",
        },
        _ => FormPaths {
            index: "/form",
            action: "/form/predict",
        },
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let action = paths(state.config.serve_mode).action;
    Html(render_form(action, &HashMap::new(), Outcome::Empty))
}

pub async fn predict(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let action = paths(state.config.serve_mode).action;
    let (values, rejection) = match form {
        Ok(Form(values)) => (values, None),
        Err(rejection) => (HashMap::new(), Some(rejection.body_text())),
    };

    let page = match evaluate(&state, &values, rejection).await {
        Ok(assessment) => {
            tracing::debug!(
                "Form prediction: burnout={} productivity={}",
                assessment.burnout_risk,
                assessment.productivity
            );
            render_form(action, &values, Outcome::Result(assessment))
        }
        Err(e) => {
            tracing::warn!("Form prediction failed: {}", e);
            render_form(action, &values, Outcome::Error(&e.to_string()))
        }
    };

    Html(page)
}

async fn evaluate(
    state: &AppState,
    values: &HashMap<String, String>,
    rejection: Option<String>,
) -> AppResult<Assessment> {
    let models = service::require_form_models(&state.registry)?;
    if let Some(reason) = rejection {
        return Err(AppError::MalformedRequest(reason));
    }
    let features = FormFeatures::from_fields(values)?;

    service::run_blocking(move || service::assess(&models, features.as_slice())).await
}

/// Client-side input clamping
pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT,
    )
}
