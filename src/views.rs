//! HTML page for the form adapter
//!
//! One page, re-rendered on every request. Submitted values are echoed back
//! into the inputs; all dynamic text goes through [`escape`].

use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{FIELD_MAX, FIELD_MIN, FORM_FIELDS};
use crate::service::{format_label, Assessment};

/// What to show below the form
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Empty,
    Result(Assessment),
    Error(&'a str),
}

/// Render the form page
pub fn render_form(action: &str, values: &HashMap<String, String>, outcome: Outcome<'_>) -> String {
    let mut inputs = String::new();
    for name in FORM_FIELDS {
        let value = values.get(name).map(|v| escape(v)).unwrap_or_default();
        let _ = write!(
            inputs,
            r#"
        <label for="{name}">{label}</label>
        <input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="any" value="{value}" required>"#,
            name = name,
            label = field_label(name),
            min = FIELD_MIN,
            max = FIELD_MAX,
            value = value,
        );
    }

    let result = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Result(assessment) => format!(
            r#"
    <section class="result">
        <p>Burnout risk: <strong id="burnout_risk">{}</strong></p>
        <p>Productivity: <strong id="productivity">{:.2}</strong></p>
    </section>"#,
            escape(&format_label(assessment.burnout_risk)),
            assessment.productivity,
        ),
        Outcome::Error(message) => format!(
            r#"
    <section class="error">
        <p id="error">{}</p>
    </section>"#,
            escape(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>MindTrack - Burnout &amp; Productivity</title>
</head>
<body>
    <h1>MindTrack</h1>
    <form method="post" action="{action}">{inputs}
        <button type="submit">Predict</button>
    </form>{result}
    <script src="/static/script.js"></script>
</body>
</html>
"#,
        action = escape(action),
        inputs = inputs,
        result = result,
    )
}

fn field_label(name: &str) -> &'static str {
    match name {
        "StressLevel" => "Stress level",
        "SleepHours" => "Sleep hours",
        "Workload" => "Workload",
        "ManagerSupport" => "Manager support",
        "WorkLifeBalance" => "Work-life balance",
        "PhysicalActivity" => "Physical activity",
        _ => "",
    }
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
