//! Startup loader and model registry
//!
//! Every configured artifact is loaded once, before the listener binds. A
//! missing, unreadable or malformed file never stops the process: the slot is
//! simply left empty and reported as not loaded.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::bundle::{ArtifactMetadata, JsonBundle};
use super::onnx::OnnxModel;
use super::{Model, ModelError, ModelSlot};
use crate::config::ArtifactPaths;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Onnx,
    Json,
}

impl ArtifactFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "onnx" => Ok(ArtifactFormat::Onnx),
            "json" => Ok(ArtifactFormat::Json),
            "pkl" | "pickle" | "joblib" => Err(ModelError::UnsupportedFormat(format!(
                "{} (Python pickles must be exported to ONNX or a JSON bundle)",
                path.display()
            ))),
            _ => Err(ModelError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactFormat::Onnx => f.write_str("onnx"),
            ArtifactFormat::Json => f.write_str("json"),
        }
    }
}

// ============================================================================
// ARTIFACT INFO
// ============================================================================

/// Load report for one slot
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub slot: ModelSlot,
    pub path: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ArtifactFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactInfo {
    fn failed(slot: ModelSlot, path: &Path, error: &ModelError) -> Self {
        Self {
            slot,
            path: path.display().to_string(),
            loaded: false,
            format: None,
            sha256: None,
            loaded_at: None,
            feature_names: None,
            version: None,
            error: Some(error.to_string()),
        }
    }
}

/// A successfully deserialized artifact
pub struct LoadedArtifact {
    pub model: Arc<dyn Model>,
    pub format: ArtifactFormat,
    pub sha256: String,
    pub feature_names: Option<Vec<String>>,
    pub version: Option<String>,
}

/// Deserialize one artifact file
pub fn load_artifact(path: &Path) -> Result<LoadedArtifact, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    let format = ArtifactFormat::from_path(path)?;

    let bytes = fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let (model, metadata): (Arc<dyn Model>, _) = match format {
        ArtifactFormat::Onnx => (Arc::new(OnnxModel::from_bytes(&bytes)?), ArtifactMetadata::default()),
        ArtifactFormat::Json => {
            let bundle = JsonBundle::from_slice(&bytes)?;
            let metadata = bundle.metadata().clone();
            (Arc::new(bundle), metadata)
        }
    };

    Ok(LoadedArtifact {
        model,
        format,
        sha256,
        feature_names: metadata.feature_names,
        version: metadata.version,
    })
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Process-wide, read-only set of model handles
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<ModelSlot, Arc<dyn Model>>,
    artifacts: Vec<ArtifactInfo>,
}

impl ModelRegistry {
    /// Registry with no models loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the artifacts for the given slots
    pub fn load(paths: &ArtifactPaths, slots: &[ModelSlot]) -> Self {
        let mut registry = Self::empty();

        for &slot in slots {
            let path = paths.get(slot);
            match load_artifact(path) {
                Ok(artifact) => {
                    tracing::info!(
                        "Loaded {} artifact {} ({}, sha256={})",
                        slot,
                        path.display(),
                        artifact.format,
                        artifact.sha256
                    );
                    registry.insert_loaded(slot, path, artifact);
                }
                Err(e @ ModelError::NotFound(_)) => {
                    tracing::warn!("⚠️ Artifact not found for {}: {}", slot, path.display());
                    registry.artifacts.push(ArtifactInfo::failed(slot, path, &e));
                }
                Err(e) => {
                    tracing::error!("Failed to load {} artifact {}: {}", slot, path.display(), e);
                    registry.artifacts.push(ArtifactInfo::failed(slot, path, &e));
                }
            }
        }

        registry
    }

    fn insert_loaded(&mut self, slot: ModelSlot, path: &Path, artifact: LoadedArtifact) {
        self.artifacts.push(ArtifactInfo {
            slot,
            path: path.display().to_string(),
            loaded: true,
            format: Some(artifact.format),
            sha256: Some(artifact.sha256),
            loaded_at: Some(Utc::now()),
            feature_names: artifact.feature_names,
            version: artifact.version,
            error: None,
        });
        self.models.insert(slot, artifact.model);
    }

    /// Inject an already constructed model
    pub fn with_model(mut self, slot: ModelSlot, model: Arc<dyn Model>) -> Self {
        self.artifacts.retain(|info| info.slot != slot);
        self.artifacts.push(ArtifactInfo {
            slot,
            path: "<memory>".to_string(),
            loaded: true,
            format: None,
            sha256: None,
            loaded_at: Some(Utc::now()),
            feature_names: None,
            version: None,
            error: None,
        });
        self.models.insert(slot, model);
        self
    }

    pub fn get(&self, slot: ModelSlot) -> Option<Arc<dyn Model>> {
        self.models.get(&slot).cloned()
    }

    pub fn is_loaded(&self, slot: ModelSlot) -> bool {
        self.models.contains_key(&slot)
    }

    /// True when every listed slot holds a model
    pub fn is_ready(&self, slots: &[ModelSlot]) -> bool {
        slots.iter().all(|slot| self.is_loaded(*slot))
    }

    pub fn artifacts(&self) -> &[ArtifactInfo] {
        &self.artifacts
    }

    /// Print the load status of every slot that was attempted
    pub fn log_status(&self) {
        tracing::info!("🧠 Model load status:");
        for info in &self.artifacts {
            tracing::info!(" - {} loaded: {}", info.slot, info.loaded);
        }
    }
}
