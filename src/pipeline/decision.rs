// =============================================================================
// Decision Engine — probability to Accepted / Rejected
// =============================================================================
//
// The classifier returns two class probabilities; the engine takes the
// acceptance-class mass, expresses it as a 0–100 percentage, and binarises
// against the fixed threshold.  The threshold is a configuration constant of
// the product, not something fitted from data.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::artifacts::classifier::CandidateScorer;
use crate::pipeline::features::FeatureVector;
use crate::types::DecisionStatus;

/// Acceptance cutoff in percent.  Probability >= threshold means Accepted
/// (inclusive lower bound).
pub const ACCEPT_THRESHOLD: f64 = 61.0;

/// Outcome of scoring one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    /// Acceptance probability as a percentage in [0, 100].
    pub probability: f64,
    pub status: DecisionStatus,
}

/// Score a feature vector against the fixed [`ACCEPT_THRESHOLD`].
///
/// The scorer must only be invoked when the model capability is present;
/// upstream gates on bundle availability, so there is no fallback here.
pub fn decide(features: &FeatureVector, scorer: &dyn CandidateScorer) -> Decision {
    decide_with_threshold(features, scorer, ACCEPT_THRESHOLD)
}

/// Threshold-parameterised variant, used by tests probing the boundary.
pub fn decide_with_threshold(
    features: &FeatureVector,
    scorer: &dyn CandidateScorer,
    threshold: f64,
) -> Decision {
    let [_, accept_mass] = scorer.class_probabilities(features);
    let probability = accept_mass * 100.0;

    let status = if probability >= threshold {
        DecisionStatus::Accepted
    } else {
        DecisionStatus::Rejected
    };

    Decision {
        probability,
        status,
    }
}

// =============================================================================
// DecisionRecord
// =============================================================================

/// One row of the run history: created per prediction, appended to the
/// history log, never mutated afterwards.
///
/// Serde renames pin the CSV header names the dashboard and the download
/// artifact use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Probability")]
    pub probability: f64,
    #[serde(rename = "Status")]
    pub status: DecisionStatus,
}

impl DecisionRecord {
    pub fn new(name: impl Into<String>, decision: Decision) -> Self {
        Self {
            name: name.into(),
            probability: decision.probability,
            status: decision.status,
        }
    }
}
