// =============================================================================
// Feature Builder — raw candidate attributes to model feature vector
// =============================================================================
//
// The classifier was trained on features in one exact column order; feeding
// it anything else corrupts predictions silently.  The order therefore lives
// in one place: the `FeatureVector` struct and the `FEATURE_COLUMNS` schema
// constant, which artifact loading validates against.
//
// Step 1 — Validate numeric ranges (strategy validity is enforced by the
//          type system at the parse boundary).
// Step 2 — Derive TotalScore and Skill_Experience_Interaction from the RAW
//          inputs.  These must never see scaled values.
// Step 3 — One-hot encode the recruitment strategy.
// Step 4 — Scale exactly {ExperienceYears, InterviewScore, SkillScore,
//          PersonalityScore} with the pre-fit transform.
// Step 5 — Assemble the fixed-order vector.
// =============================================================================

use crate::artifacts::scaler::ScalingTransform;
use crate::pipeline::error::PipelineResult;
use crate::types::CandidateRecord;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 10;

/// The classifier's column order.  Load-bearing: artifact loading rejects
/// any model or scaler whose declared columns disagree with this list.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "EducationLevel",
    "ExperienceYears",
    "InterviewScore",
    "SkillScore",
    "PersonalityScore",
    "RecruitmentStrategy_1",
    "RecruitmentStrategy_2",
    "TotalScore",
    "Skill_Experience_Interaction",
    "RecruitmentStrategy_3",
];

/// The ordered numeric record handed to the classifier.
///
/// Field order mirrors [`FEATURE_COLUMNS`]; `as_array` is the only
/// projection, so a reordering mistake is a single-site review, not a
/// scattered one.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub education_level: f64,
    /// Scaled.
    pub experience_years: f64,
    /// Scaled.
    pub interview_score: f64,
    /// Scaled.
    pub skill_score: f64,
    /// Scaled.
    pub personality_score: f64,
    pub recruitment_strategy_1: f64,
    pub recruitment_strategy_2: f64,
    /// Sum of the three raw scores, computed before scaling.
    pub total_score: f64,
    /// Raw SkillScore × raw ExperienceYears, computed before scaling.
    pub skill_experience_interaction: f64,
    pub recruitment_strategy_3: f64,
}

impl FeatureVector {
    /// Project the vector in the classifier's column order.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.education_level,
            self.experience_years,
            self.interview_score,
            self.skill_score,
            self.personality_score,
            self.recruitment_strategy_1,
            self.recruitment_strategy_2,
            self.total_score,
            self.skill_experience_interaction,
            self.recruitment_strategy_3,
        ]
    }
}

/// Build the feature vector for one candidate.
///
/// Deterministic: identical record and scaler always produce an identical
/// vector.
pub fn build_features(
    record: &CandidateRecord,
    scaler: &ScalingTransform,
) -> PipelineResult<FeatureVector> {
    // ── 1. Range validation ─────────────────────────────────────────────
    record.validate()?;

    let experience = f64::from(record.experience_years);
    let interview = f64::from(record.interview_score);
    let skill = f64::from(record.skill_score);
    let personality = f64::from(record.personality_score);

    // ── 2. Derived columns from RAW values ──────────────────────────────
    let total_score = skill + interview + personality;
    let skill_experience_interaction = skill * experience;

    // ── 3. One-hot strategy encoding ────────────────────────────────────
    let [strategy_1, strategy_2, strategy_3] = record.recruitment_strategy.one_hot();

    // ── 4. Scale the four numeric columns ───────────────────────────────
    let [experience, interview, skill, personality] =
        scaler.transform([experience, interview, skill, personality]);

    // ── 5. Fixed-order assembly ─────────────────────────────────────────
    Ok(FeatureVector {
        education_level: record.education_level.as_feature(),
        experience_years: experience,
        interview_score: interview,
        skill_score: skill,
        personality_score: personality,
        recruitment_strategy_1: strategy_1,
        recruitment_strategy_2: strategy_2,
        total_score,
        skill_experience_interaction,
        recruitment_strategy_3: strategy_3,
    })
}
