//! Stacking-ensemble model adapter: Implementation of `RiskModel`.
//!
//! Loads the classifier exported by the training pipeline as JSON.
//!
//! # Artifact layout
//!
//! A model directory contains `model.json` and optionally `manifest.json`.
//! When the manifest is present it binds every listed file by SHA-256; a
//! mismatch means the artifact is corrupt and loading fails.
//!
//! # Prediction
//!
//! Features are standardized with the exported scaler, each base estimator
//! produces a logistic probability, and the final estimator combines those
//! probabilities with another logistic layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{FeatureVector, FEATURE_COUNT, FEATURE_ENCODING_VERSION, FEATURE_NAMES};
use crate::ports::{ModelError, ModelLoader, RiskModel};

/// Supported `model.json` format.
const MODEL_FORMAT_VERSION: u32 = 1;

/// Supported `manifest.json` format.
const MANIFEST_VERSION: u32 = 1;

const MODEL_FILE: &str = "model.json";
const MANIFEST_FILE: &str = "manifest.json";

/// Upper bound on base estimators; anything larger is not a model we exported.
const MAX_ESTIMATORS: usize = 64;

/// Standardization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// One logistic layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinear {
    #[serde(default)]
    pub name: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl ExportedLinear {
    fn probability(&self, inputs: &[f64]) -> f64 {
        let z = self
            .coefficients
            .iter()
            .zip(inputs)
            .fold(self.intercept, |acc, (w, x)| acc + w * x);
        sigmoid(z)
    }
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedStackingModel {
    pub format_version: u32,
    pub encoding_version: u32,
    pub feature_names: Vec<String>,
    pub scaler: ExportedScaler,
    pub estimators: Vec<ExportedLinear>,
    pub final_estimator: ExportedLinear,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ModelManifest {
    version: u32,
    files: BTreeMap<String, String>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn artifact_err(msg: impl Into<String>) -> ModelError {
    ModelError::Artifact(msg.into())
}

/// Loaded stacking ensemble.
#[derive(Debug, Clone)]
pub struct StackingModel {
    params: ExportedStackingModel,
}

impl StackingModel {
    /// Build from already-parsed parameters, checking the feature contract.
    ///
    /// # Errors
    /// Returns `ModelError::Artifact` if the parameters are inconsistent or
    /// were trained against a different feature encoding.
    pub fn from_params(params: ExportedStackingModel) -> Result<Self, ModelError> {
        if params.format_version != MODEL_FORMAT_VERSION {
            return Err(artifact_err(format!(
                "unsupported model format_version {} (expected {MODEL_FORMAT_VERSION})",
                params.format_version
            )));
        }
        if params.encoding_version != FEATURE_ENCODING_VERSION {
            return Err(artifact_err(format!(
                "model trained for feature encoding v{}, this build encodes v{FEATURE_ENCODING_VERSION}",
                params.encoding_version
            )));
        }
        if params.feature_names.len() != FEATURE_COUNT
            || params
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(got, want)| got != want)
        {
            return Err(artifact_err(format!(
                "feature order mismatch: model expects {:?}, encoder produces {:?}",
                params.feature_names, FEATURE_NAMES
            )));
        }
        if params.scaler.mean.len() != FEATURE_COUNT || params.scaler.scale.len() != FEATURE_COUNT {
            return Err(artifact_err("scaler length does not match feature count"));
        }
        if params
            .scaler
            .scale
            .iter()
            .any(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(artifact_err("scaler contains zero or non-finite scale"));
        }

        let n = params.estimators.len();
        if n == 0 || n > MAX_ESTIMATORS {
            return Err(artifact_err(format!(
                "invalid estimator count: got {n}, expected 1..={MAX_ESTIMATORS}"
            )));
        }
        if let Some(bad) = params
            .estimators
            .iter()
            .find(|e| e.coefficients.len() != FEATURE_COUNT)
        {
            return Err(artifact_err(format!(
                "estimator {:?} has {} coefficients, expected {FEATURE_COUNT}",
                bad.name,
                bad.coefficients.len()
            )));
        }
        if params.final_estimator.coefficients.len() != n {
            return Err(artifact_err(format!(
                "final estimator has {} coefficients, expected {n}",
                params.final_estimator.coefficients.len()
            )));
        }

        let all_finite = params
            .scaler
            .mean
            .iter()
            .chain(params.estimators.iter().flat_map(|e| e.coefficients.iter()))
            .chain(params.estimators.iter().map(|e| &e.intercept))
            .chain(params.final_estimator.coefficients.iter())
            .chain(std::iter::once(&params.final_estimator.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(artifact_err("model contains non-finite parameters"));
        }

        Ok(Self { params })
    }

    /// Load `model.json` from a directory (or a direct file path).
    ///
    /// # Errors
    /// Returns `ModelError::Artifact` if the file is missing, fails its
    /// manifest hash, or does not parse into a valid model.
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        let (base_dir, model_file) = if model_path.is_file() {
            let dir = model_path.parent().unwrap_or_else(|| Path::new("."));
            (dir.to_path_buf(), model_path.to_path_buf())
        } else {
            (model_path.to_path_buf(), model_path.join(MODEL_FILE))
        };

        if !model_file.exists() {
            return Err(artifact_err(format!(
                "no model artifact at {}",
                model_file.display()
            )));
        }

        verify_manifest(&base_dir, &model_file)?;

        let content = std::fs::read_to_string(&model_file).map_err(|e| {
            artifact_err(format!("failed to read {}: {e}", model_file.display()))
        })?;
        let params: ExportedStackingModel = serde_json::from_str(&content).map_err(|e| {
            artifact_err(format!("invalid model format in {}: {e}", model_file.display()))
        })?;

        let model = Self::from_params(params)?;

        tracing::info!(
            "Loaded stacking model from {:?} (estimators={:?}, encoding=v{})",
            model_file,
            model.estimator_names(),
            model.params.encoding_version
        );

        Ok(model)
    }

    /// Names of the base estimators, in stacking order.
    #[must_use]
    pub fn estimator_names(&self) -> Vec<&str> {
        self.params
            .estimators
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    fn positive_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let scaler = &self.params.scaler;
        let z: Vec<f64> = features
            .as_slice()
            .iter()
            .zip(scaler.mean.iter().zip(&scaler.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        let base: Vec<f64> = self
            .params
            .estimators
            .iter()
            .map(|e| e.probability(&z))
            .collect();

        let p = self.params.final_estimator.probability(&base);
        if !p.is_finite() {
            return Err(ModelError::Prediction(
                "model produced a non-finite probability".into(),
            ));
        }
        Ok(p)
    }
}

impl RiskModel for StackingModel {
    fn predict_proba(&self, batch: &[FeatureVector]) -> Result<Vec<[f64; 2]>, ModelError> {
        if let Some(bad) = batch
            .iter()
            .find(|row| row.as_slice().iter().any(|v| !v.is_finite()))
        {
            return Err(ModelError::Prediction(format!(
                "non-finite feature value in {bad:?}"
            )));
        }

        batch
            .iter()
            .map(|row| self.positive_probability(row).map(|p| [1.0 - p, p]))
            .collect()
    }
}

/// Check `manifest.json` hashes when a manifest is present.
fn verify_manifest(base_dir: &Path, model_file: &Path) -> Result<(), ModelError> {
    let manifest_path = base_dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        tracing::warn!(
            "No {} beside {:?}; loading model without integrity check",
            MANIFEST_FILE,
            model_file
        );
        return Ok(());
    }

    let bytes = std::fs::read(&manifest_path)
        .map_err(|e| artifact_err(format!("failed to read manifest: {e}")))?;
    let manifest: ModelManifest = serde_json::from_slice(&bytes)
        .map_err(|e| artifact_err(format!("invalid manifest.json format: {e}")))?;

    if manifest.version != MANIFEST_VERSION {
        return Err(artifact_err(format!(
            "unsupported manifest version: {}",
            manifest.version
        )));
    }

    let model_name = model_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(MODEL_FILE);
    if !manifest.files.contains_key(model_name) {
        return Err(artifact_err(format!(
            "manifest.json does not bind {model_name}"
        )));
    }

    for (rel, expected_hex) in &manifest.files {
        let path = base_dir.join(rel);
        let content = std::fs::read(&path).map_err(|e| {
            artifact_err(format!(
                "manifest references missing/unreadable file {:?}: {e}",
                path
            ))
        })?;
        if !sha256_hex(&content).eq_ignore_ascii_case(expected_hex.trim()) {
            return Err(artifact_err(format!("file hash mismatch for {rel}")));
        }
    }

    tracing::debug!("Manifest verified ({} files)", manifest.files.len());
    Ok(())
}

/// Hash `model.json` in `model_dir` (or the given model file) and write the
/// `manifest.json` that `StackingModel::load` verifies.
///
/// # Errors
/// Returns `ModelError::Artifact` if the model cannot be read or the
/// manifest cannot be written.
pub fn write_manifest(model_path: &Path) -> Result<PathBuf, ModelError> {
    let (base_dir, model_file) = if model_path.is_dir() {
        (model_path.to_path_buf(), model_path.join(MODEL_FILE))
    } else {
        let parent = model_path
            .parent()
            .ok_or_else(|| artifact_err("model path has no parent directory"))?;
        (parent.to_path_buf(), model_path.to_path_buf())
    };

    let bytes = std::fs::read(&model_file)
        .map_err(|e| artifact_err(format!("failed to read {:?}: {e}", model_file)))?;
    // Refuse to bless something the loader would reject anyway.
    let params: ExportedStackingModel = serde_json::from_slice(&bytes)
        .map_err(|e| artifact_err(format!("invalid model.json format: {e}")))?;
    StackingModel::from_params(params)?;

    let name = model_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| artifact_err("model file name is not valid UTF-8"))?;
    let manifest = ModelManifest {
        version: MANIFEST_VERSION,
        files: BTreeMap::from([(name.to_string(), sha256_hex(&bytes))]),
    };
    let json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| artifact_err(format!("failed to serialize manifest: {e}")))?;

    let manifest_path = base_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, json)
        .map_err(|e| artifact_err(format!("failed to write {:?}: {e}", manifest_path)))?;

    tracing::info!("Wrote {:?}", manifest_path);
    Ok(manifest_path)
}

/// Loads a `StackingModel` from a configured path.
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    path: PathBuf,
}

impl FileModelLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for FileModelLoader {
    type Model = StackingModel;

    fn load(&self) -> Result<StackingModel, ModelError> {
        StackingModel::load(&self.path)
    }
}
