// =============================================================================
// Candidate Scorer — opaque pre-trained binary classifier
// =============================================================================
//
// The pipeline only ever sees the `CandidateScorer` capability: feature
// vector in, two-class probability distribution out.  Production loads an
// exported classifier artifact (per-feature weights + intercept, logistic
// link, index 1 = accepted class); tests substitute deterministic fakes.
//
// The artifact declares the column order it was exported with, and loading
// rejects any artifact whose order disagrees with `FEATURE_COLUMNS` — a
// reordered export becomes a startup error instead of a silent accuracy
// regression.
// =============================================================================

use std::path::Path;

use serde::Deserialize;

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};

/// Capability interface for the scoring model.
///
/// Returns the probability distribution over [rejected, accepted].
pub trait CandidateScorer: Send + Sync {
    fn class_probabilities(&self, features: &FeatureVector) -> [f64; 2];
}

/// Classifier exported from the offline training run.
#[derive(Debug, Clone)]
pub struct ExportedClassifier {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
}

/// On-disk artifact shape.
#[derive(Debug, Deserialize)]
struct ClassifierArtifact {
    columns: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl ExportedClassifier {
    pub fn new(weights: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self { weights, intercept }
    }

    /// Load and validate the JSON artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!(
                "failed to read model artifact {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let artifact: ClassifierArtifact = serde_json::from_str(json)
            .map_err(|e| PipelineError::configuration(format!("invalid model artifact: {e}")))?;

        // Exact match, order included.
        if artifact.columns != FEATURE_COLUMNS {
            return Err(PipelineError::configuration(format!(
                "model artifact columns {:?} do not match the trained feature order {:?}",
                artifact.columns, FEATURE_COLUMNS
            )));
        }

        let weights: [f64; FEATURE_COUNT] =
            artifact.weights.try_into().map_err(|v: Vec<f64>| {
                PipelineError::configuration(format!(
                    "model artifact has {} weights, expected {FEATURE_COUNT}",
                    v.len()
                ))
            })?;

        if !artifact.intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::configuration(
                "model artifact contains non-finite parameters",
            ));
        }

        Ok(Self::new(weights, artifact.intercept))
    }
}

impl CandidateScorer for ExportedClassifier {
    fn class_probabilities(&self, features: &FeatureVector) -> [f64; 2] {
        let values = features.as_array();

        let mut score = self.intercept;
        for (weight, value) in self.weights.iter().zip(values.iter()) {
            score += weight * value;
        }

        // Logistic link; index 1 is the accepted class.
        let accept = 1.0 / (1.0 + (-score).exp());
        [1.0 - accept, accept]
    }
}
