//! Classifier port: the externally trained binary model.
//!
//! The model is opaque. The application only relies on per-class
//! probabilities with the positive class at index 1.

use crate::domain::FeatureVector;

/// Index of the positive class in `predict_proba` rows.
pub const POSITIVE_CLASS: usize = 1;

/// Errors raised at the model boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Artifact missing, unreadable, corrupt or built for another feature contract
    #[error("model artifact unavailable: {0}")]
    Artifact(String),

    /// The model rejected or failed on an input
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// A trained binary classifier.
///
/// Implementations are loaded once and shared read-only, so they must be
/// `Send + Sync` and must not mutate on `predict_proba`.
pub trait RiskModel: Send + Sync {
    /// Per-class probabilities `[negative, positive]` for each input row.
    ///
    /// # Errors
    /// Returns `ModelError::Prediction` if the model cannot score the batch.
    fn predict_proba(&self, batch: &[FeatureVector]) -> Result<Vec<[f64; 2]>, ModelError>;
}

/// Loads a model artifact once per process.
pub trait ModelLoader {
    type Model: RiskModel;

    /// # Errors
    /// Returns `ModelError::Artifact` if the artifact cannot be loaded.
    fn load(&self) -> Result<Self::Model, ModelError>;
}
