// =============================================================================
// Scaling Transform — pre-fit standard scaler over four numeric columns
// =============================================================================
//
// The transform was fitted offline alongside the classifier and exported as
// a JSON artifact carrying its column list, per-column means and scales.
// It applies `(x - mean) / scale` to exactly {ExperienceYears,
// InterviewScore, SkillScore, PersonalityScore} — never to the derived
// columns, never to EducationLevel.
// =============================================================================

use std::path::Path;

use serde::Deserialize;

use crate::pipeline::error::{PipelineError, PipelineResult};

/// Number of columns the scaler covers.
pub const SCALED_COLUMN_COUNT: usize = 4;

/// The columns the transform applies to, in transform order.
pub const SCALED_COLUMNS: [&str; SCALED_COLUMN_COUNT] = [
    "ExperienceYears",
    "InterviewScore",
    "SkillScore",
    "PersonalityScore",
];

/// Deterministic, read-only normalisation shared across all requests.
#[derive(Debug, Clone)]
pub struct ScalingTransform {
    mean: [f64; SCALED_COLUMN_COUNT],
    scale: [f64; SCALED_COLUMN_COUNT],
}

/// On-disk artifact shape.
#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl ScalingTransform {
    /// Build a transform from explicit parameters, rejecting degenerate
    /// scales (zero or non-finite) that would corrupt every prediction.
    pub fn new(
        mean: [f64; SCALED_COLUMN_COUNT],
        scale: [f64; SCALED_COLUMN_COUNT],
    ) -> PipelineResult<Self> {
        for (i, &s) in scale.iter().enumerate() {
            if s == 0.0 || !s.is_finite() {
                return Err(PipelineError::configuration(format!(
                    "scaler artifact has invalid scale {} for column {}",
                    s, SCALED_COLUMNS[i]
                )));
            }
        }
        for (i, &m) in mean.iter().enumerate() {
            if !m.is_finite() {
                return Err(PipelineError::configuration(format!(
                    "scaler artifact has non-finite mean for column {}",
                    SCALED_COLUMNS[i]
                )));
            }
        }
        Ok(Self { mean, scale })
    }

    /// A no-op transform (mean 0, scale 1).  Used by tests that pin exact
    /// feature values.
    pub fn identity() -> Self {
        Self {
            mean: [0.0; SCALED_COLUMN_COUNT],
            scale: [1.0; SCALED_COLUMN_COUNT],
        }
    }

    /// Load and validate the JSON artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!(
                "failed to read scaler artifact {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let artifact: ScalerArtifact = serde_json::from_str(json)
            .map_err(|e| PipelineError::configuration(format!("invalid scaler artifact: {e}")))?;

        if artifact.columns != SCALED_COLUMNS {
            return Err(PipelineError::configuration(format!(
                "scaler artifact columns {:?} do not match the expected {:?}",
                artifact.columns, SCALED_COLUMNS
            )));
        }

        let mean: [f64; SCALED_COLUMN_COUNT] = artifact.mean.try_into().map_err(|v: Vec<f64>| {
            PipelineError::configuration(format!(
                "scaler artifact has {} means, expected {SCALED_COLUMN_COUNT}",
                v.len()
            ))
        })?;
        let scale: [f64; SCALED_COLUMN_COUNT] =
            artifact.scale.try_into().map_err(|v: Vec<f64>| {
                PipelineError::configuration(format!(
                    "scaler artifact has {} scales, expected {SCALED_COLUMN_COUNT}",
                    v.len()
                ))
            })?;

        Self::new(mean, scale)
    }

    /// Apply `(x - mean) / scale` column-wise.
    pub fn transform(
        &self,
        raw: [f64; SCALED_COLUMN_COUNT],
    ) -> [f64; SCALED_COLUMN_COUNT] {
        let mut out = [0.0; SCALED_COLUMN_COUNT];
        for i in 0..SCALED_COLUMN_COUNT {
            out[i] = (raw[i] - self.mean[i]) / self.scale[i];
        }
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_values_untouched() {
        let raw = [5.0, 70.0, 80.0, 75.0];
        assert_eq!(ScalingTransform::identity().transform(raw), raw);
    }

    #[test]
    fn transform_applies_mean_and_scale_per_column() {
        let scaler =
            ScalingTransform::new([4.0, 50.0, 50.0, 50.0], [2.0, 10.0, 20.0, 25.0]).unwrap();
        let out = scaler.transform([5.0, 70.0, 80.0, 75.0]);
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - 2.0).abs() < 1e-12);
        assert!((out[2] - 1.5).abs() < 1e-12);
        assert!((out[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_scale_is_a_configuration_error() {
        let err = ScalingTransform::new([0.0; 4], [1.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("InterviewScore"));
    }

    #[test]
    fn artifact_round_trips_through_json() {
        let json = r#"{
            "columns": ["ExperienceYears", "InterviewScore", "SkillScore", "PersonalityScore"],
            "mean": [7.2, 50.5, 49.8, 51.1],
            "scale": [4.1, 28.9, 29.3, 28.4]
        }"#;
        let scaler = ScalingTransform::from_json(json).unwrap();
        let out = scaler.transform([7.2, 50.5, 49.8, 51.1]);
        for v in out {
            assert!(v.abs() < 1e-12, "value at the fitted mean must scale to 0");
        }
    }

    #[test]
    fn artifact_with_wrong_columns_is_rejected() {
        // Reordered columns would silently shift every scaled value.
        let json = r#"{
            "columns": ["InterviewScore", "ExperienceYears", "SkillScore", "PersonalityScore"],
            "mean": [0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0]
        }"#;
        assert!(ScalingTransform::from_json(json).unwrap_err().is_configuration());
    }

    #[test]
    fn artifact_with_wrong_arity_is_rejected() {
        let json = r#"{
            "columns": ["ExperienceYears", "InterviewScore", "SkillScore", "PersonalityScore"],
            "mean": [0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0]
        }"#;
        assert!(ScalingTransform::from_json(json).is_err());
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = ScalingTransform::load("/nonexistent/scaler.json").unwrap_err();
        assert!(err.is_configuration());
    }
}
