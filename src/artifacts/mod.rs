// =============================================================================
// Model Artifacts — pre-trained classifier + companion scaler
// =============================================================================
//
// Both artifacts are loaded once at process start and shared read-only for
// the process lifetime.  The capability is all-or-nothing: if either file is
// missing or invalid, prediction stays disabled and every scoring endpoint
// answers 503 until a restart.

pub mod classifier;
pub mod scaler;

use std::path::Path;

use tracing::info;

use crate::pipeline::decision::{decide, Decision};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::features::build_features;
use crate::types::CandidateRecord;

use classifier::ExportedClassifier;
use scaler::ScalingTransform;

/// The loaded prediction capability: scaler + classifier, always together.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub scaler: ScalingTransform,
    pub classifier: ExportedClassifier,
}

impl ModelBundle {
    /// Load both artifacts.  Fails as a whole if either is unusable — there
    /// is no partially-degraded prediction mode.
    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> PipelineResult<Self> {
        let classifier = ExportedClassifier::load(model_path.as_ref())?;
        let scaler = ScalingTransform::load(scaler_path.as_ref())?;

        info!(
            model = %model_path.as_ref().display(),
            scaler = %scaler_path.as_ref().display(),
            "model bundle loaded"
        );

        Ok(Self { scaler, classifier })
    }

    /// Run the full pipeline for one candidate: features, then decision.
    pub fn score(&self, record: &CandidateRecord) -> PipelineResult<Decision> {
        let features = build_features(record, &self.scaler)?;
        Ok(decide(&features, &self.classifier))
    }
}
