//! Configuration module

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::inference::ModelSlot;

/// Which presentation adapters are mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// JSON API at `/`
    Api,
    /// HTML form at `/`
    Form,
    /// JSON API at `/`, HTML form under `/form`
    Both,
}

impl ServeMode {
    /// Slots that must be loaded for this mode to be considered ready
    pub fn required_slots(&self) -> &'static [ModelSlot] {
        match self {
            ServeMode::Api => &[ModelSlot::Classification, ModelSlot::Regression],
            ServeMode::Form => &[ModelSlot::Burnout, ModelSlot::Productivity, ModelSlot::Scaler],
            ServeMode::Both => &ModelSlot::ALL,
        }
    }

    pub fn serves_api(&self) -> bool {
        matches!(self, ServeMode::Api | ServeMode::Both)
    }

    pub fn serves_form(&self) -> bool {
        matches!(self, ServeMode::Form | ServeMode::Both)
    }
}

impl FromStr for ServeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "json" => Ok(ServeMode::Api),
            "form" | "html" => Ok(ServeMode::Form),
            "both" | "all" => Ok(ServeMode::Both),
            other => Err(format!("unknown serve mode '{}'", other)),
        }
    }
}

impl fmt::Display for ServeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServeMode::Api => "api",
            ServeMode::Form => "form",
            ServeMode::Both => "both",
        };
        f.write_str(name)
    }
}

/// Artifact location for every model slot
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub classification: PathBuf,
    pub regression: PathBuf,
    pub burnout: PathBuf,
    pub productivity: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn get(&self, slot: ModelSlot) -> &PathBuf {
        match slot {
            ModelSlot::Classification => &self.classification,
            ModelSlot::Regression => &self.regression,
            ModelSlot::Burnout => &self.burnout,
            ModelSlot::Productivity => &self.productivity,
            ModelSlot::Scaler => &self.scaler,
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            classification: PathBuf::from("models/modelo_classificacao_burnoutrisk.onnx"),
            regression: PathBuf::from("models/modelo_regressao_xgboost.onnx"),
            burnout: PathBuf::from("models/modelo_burnout.onnx"),
            productivity: PathBuf::from("models/modelo_produtividade.onnx"),
            scaler: PathBuf::from("models/scaler.onnx"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Mounted adapters
    pub serve_mode: ServeMode,

    /// Environment (development, production)
    pub environment: String,

    /// Model artifact files
    pub artifacts: ArtifactPaths,

    /// Settings that failed to parse and fell back to their default
    pub rejected: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ArtifactPaths::default();
        let path = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        let mut rejected = Vec::new();
        let port = parse_or("PORT", lookup("PORT"), 8000, &mut rejected);
        let serve_mode = parse_or("SERVE_MODE", lookup("SERVE_MODE"), ServeMode::Both, &mut rejected);

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),

            port,

            serve_mode,

            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),

            artifacts: ArtifactPaths {
                classification: path("CLASSIFICATION_MODEL_PATH", defaults.classification),
                regression: path("REGRESSION_MODEL_PATH", defaults.regression),
                burnout: path("BURNOUT_MODEL_PATH", defaults.burnout),
                productivity: path("PRODUCTIVITY_MODEL_PATH", defaults.productivity),
                scaler: path("SCALER_PATH", defaults.scaler),
            },

            rejected,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Parsing runs before the subscriber exists, so failures are collected
// and logged by the caller once tracing is up.
fn parse_or<T>(key: &str, raw: Option<String>, default: T, rejected: &mut Vec<String>) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|e| {
            rejected.push(format!("{}={:?}: {}", key, value, e));
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.serve_mode, ServeMode::Both);
        assert!(!config.is_production());
        assert!(config.rejected.is_empty());
        assert_eq!(
            config.artifacts.classification,
            PathBuf::from("models/modelo_classificacao_burnoutrisk.onnx")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9090"),
            ("SERVE_MODE", "form"),
            ("ENVIRONMENT", "production"),
            ("SCALER_PATH", "/srv/models/scaler.json"),
        ]);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.serve_mode, ServeMode::Form);
        assert!(config.is_production());
        assert_eq!(config.artifacts.get(ModelSlot::Scaler), &PathBuf::from("/srv/models/scaler.json"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("SERVE_MODE", "grpc"), ("REGRESSION_MODEL_PATH", "  ")]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.serve_mode, ServeMode::Both);
        assert_eq!(config.artifacts.regression, ArtifactPaths::default().regression);

        assert_eq!(config.rejected.len(), 2);
        assert!(config.rejected[0].starts_with("PORT=\"eighty\""));
        assert!(config.rejected[1].starts_with("SERVE_MODE=\"grpc\""));
    }

    #[test]
    fn test_serve_mode_required_slots() {
        assert_eq!(ServeMode::Api.required_slots().len(), 2);
        assert!(ServeMode::Form.required_slots().contains(&ModelSlot::Scaler));
        assert_eq!(ServeMode::Both.required_slots().len(), ModelSlot::ALL.len());
        assert_eq!("JSON".parse::<ServeMode>(), Ok(ServeMode::Api));
        assert!(ServeMode::Form.serves_form() && !ServeMode::Form.serves_api());
    }
}
