// =============================================================================
// Prediction Pipeline
// =============================================================================
//
// Pure, side-effect-free core of the engine: raw candidate attributes are
// turned into the fixed-order feature vector the classifier was trained on,
// and the classifier's probability output is binarised against the fixed
// acceptance threshold.  Both stages are deterministic functions over their
// inputs plus the shared read-only artifacts.

pub mod decision;
pub mod error;
pub mod features;
