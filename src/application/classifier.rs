//! Risk classifier: typed, single-call wrapper over the loaded model.
//!
//! The model is loaded once at startup and shared read-only. When loading
//! failed the classifier still exists, but every prediction reports the
//! load failure so the form can render and refuse submissions.

use std::sync::Arc;

use crate::domain::{FeatureVector, Probability};
use crate::ports::{ModelError, ModelLoader, RiskModel, POSITIVE_CLASS};
use crate::AeroLungError;

enum ModelState<M> {
    Ready(Arc<M>),
    Unavailable(String),
}

/// Classifier adapter around a process-lifetime model.
pub struct RiskClassifier<M>
where
    M: RiskModel,
{
    state: ModelState<M>,
}

impl<M> RiskClassifier<M>
where
    M: RiskModel,
{
    /// Wrap an already-loaded model.
    pub fn new(model: Arc<M>) -> Self {
        Self {
            state: ModelState::Ready(model),
        }
    }

    /// A classifier whose model could not be loaded.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable(reason.into()),
        }
    }

    /// Load the model once through `loader`.
    ///
    /// A load failure is logged and captured rather than returned; see
    /// `is_ready`.
    pub fn load<L>(loader: &L) -> Self
    where
        L: ModelLoader<Model = M>,
    {
        match loader.load() {
            Ok(model) => {
                tracing::info!("Risk model ready");
                Self::new(Arc::new(model))
            }
            Err(e) => {
                tracing::error!("Risk model unavailable: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Why the model is unavailable, if it is.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready(_) => None,
            ModelState::Unavailable(reason) => Some(reason),
        }
    }

    /// Positive-class probability for one feature vector. No retries.
    ///
    /// # Errors
    /// - `ModelUnavailable` if the model was never loaded
    /// - `Inference` if the model fails or returns an invalid probability
    pub fn predict(&self, features: &FeatureVector) -> Result<Probability, AeroLungError> {
        let model = match &self.state {
            ModelState::Ready(model) => model,
            ModelState::Unavailable(reason) => {
                return Err(AeroLungError::ModelUnavailable(reason.clone()))
            }
        };

        let rows = model
            .predict_proba(std::slice::from_ref(features))
            .map_err(|e| match e {
                ModelError::Artifact(msg) => AeroLungError::ModelUnavailable(msg),
                ModelError::Prediction(msg) => AeroLungError::Inference(msg),
            })?;

        let row = match rows.as_slice() {
            [row] => row,
            other => {
                return Err(AeroLungError::Inference(format!(
                    "model returned {} rows for 1 input",
                    other.len()
                )))
            }
        };

        let raw = row[POSITIVE_CLASS];
        Probability::new(raw).ok_or_else(|| {
            AeroLungError::Inference(format!("model returned invalid probability {raw}"))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{encode, PatientInput};

    /// Model stub returning a fixed positive-class probability.
    pub(crate) struct FixedModel(pub f64);

    impl RiskModel for FixedModel {
        fn predict_proba(&self, batch: &[FeatureVector]) -> Result<Vec<[f64; 2]>, ModelError> {
            Ok(batch.iter().map(|_| [1.0 - self.0, self.0]).collect())
        }
    }

    /// Model stub that always fails to score.
    pub(crate) struct FailingModel;

    impl RiskModel for FailingModel {
        fn predict_proba(&self, _batch: &[FeatureVector]) -> Result<Vec<[f64; 2]>, ModelError> {
            Err(ModelError::Prediction("malformed input".into()))
        }
    }

    struct MissingLoader;

    impl ModelLoader for MissingLoader {
        type Model = FixedModel;

        fn load(&self) -> Result<FixedModel, ModelError> {
            Err(ModelError::Artifact("no model artifact at models/model.json".into()))
        }
    }

    fn features() -> FeatureVector {
        encode(&PatientInput::default()).unwrap()
    }

    #[test]
    fn test_predict_reads_positive_class() {
        let classifier = RiskClassifier::new(Arc::new(FixedModel(0.83)));
        let p = classifier.predict(&features()).expect("should predict");
        assert!((p.value() - 0.83).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unloaded_model_reports_unavailable() {
        let classifier = RiskClassifier::load(&MissingLoader);
        assert!(!classifier.is_ready());
        assert!(classifier.unavailable_reason().unwrap().contains("model.json"));
        assert!(matches!(
            classifier.predict(&features()),
            Err(AeroLungError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_model_failure_is_inference_error() {
        let classifier = RiskClassifier::new(Arc::new(FailingModel));
        let err = classifier.predict(&features()).expect_err("should fail");
        assert!(matches!(err, AeroLungError::Inference(_)));
        assert!(err.to_string().contains("Unable to calculate risk, please retry"));
    }

    #[test]
    fn test_out_of_range_probability_is_inference_error() {
        let classifier = RiskClassifier::new(Arc::new(FixedModel(1.5)));
        assert!(matches!(
            classifier.predict(&features()),
            Err(AeroLungError::Inference(_))
        ));
    }
}
