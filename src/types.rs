// =============================================================================
// Shared types used across the Pancarona recruitment engine
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::pipeline::error::PipelineError;

/// Upper bound for `ExperienceYears` accepted by the pipeline.
pub const MAX_EXPERIENCE_YEARS: u32 = 40;
/// Upper bound for the three interview/skill/personality scores.
pub const MAX_SCORE: u32 = 100;

// =============================================================================
// EducationLevel
// =============================================================================

/// Highest education attained by a candidate, coded 1–4 as in the training
/// data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EducationLevel {
    HighSchool,
    Bachelor,
    Master,
    PhD,
}

impl EducationLevel {
    /// Integer code used by the model and by form/CSV input.
    pub fn code(&self) -> u8 {
        match self {
            Self::HighSchool => 1,
            Self::Bachelor => 2,
            Self::Master => 3,
            Self::PhD => 4,
        }
    }

    /// The raw feature value fed to the model (the code, unscaled).
    pub fn as_feature(&self) -> f64 {
        f64::from(self.code())
    }
}

impl TryFrom<u8> for EducationLevel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::HighSchool),
            2 => Ok(Self::Bachelor),
            3 => Ok(Self::Master),
            4 => Ok(Self::PhD),
            other => Err(format!("invalid education level code: {other} (expected 1-4)")),
        }
    }
}

impl From<EducationLevel> for u8 {
    fn from(level: EducationLevel) -> u8 {
        level.code()
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighSchool => write!(f, "High School"),
            Self::Bachelor => write!(f, "Bachelor"),
            Self::Master => write!(f, "Master"),
            Self::PhD => write!(f, "PhD"),
        }
    }
}

// =============================================================================
// RecruitmentStrategy
// =============================================================================

/// How the candidate was sourced. The model one-hot encodes this into three
/// indicator columns; an unknown value is a data error, never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum RecruitmentStrategy {
    Referral,
    JobFair,
    Outsourcing,
}

impl RecruitmentStrategy {
    /// Integer code used by some entry paths (1 = Referral, 2 = Job Fair,
    /// 3 = Outsourcing).
    pub fn code(&self) -> u8 {
        match self {
            Self::Referral => 1,
            Self::JobFair => 2,
            Self::Outsourcing => 3,
        }
    }

    /// Canonical label as it appears in forms and CSV files.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Referral => "Referral",
            Self::JobFair => "Job Fair",
            Self::Outsourcing => "Outsourcing",
        }
    }

    /// One-hot indicator columns (RecruitmentStrategy_1, _2, _3).
    /// Exactly one element is 1.0 for every known strategy.
    pub fn one_hot(&self) -> [f64; 3] {
        match self {
            Self::Referral => [1.0, 0.0, 0.0],
            Self::JobFair => [0.0, 1.0, 0.0],
            Self::Outsourcing => [0.0, 0.0, 1.0],
        }
    }

    pub fn from_code(code: u8) -> Result<Self, PipelineError> {
        match code {
            1 => Ok(Self::Referral),
            2 => Ok(Self::JobFair),
            3 => Ok(Self::Outsourcing),
            _ => Err(PipelineError::invalid_category(code.to_string())),
        }
    }

    /// Parse a strategy from either its label or its integer code.
    ///
    /// Matching is case-insensitive and whitespace-tolerant so that CSV
    /// exports from spreadsheet tools round-trip cleanly.
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let trimmed = raw.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code);
        }
        match trimmed.to_lowercase().as_str() {
            "referral" => Ok(Self::Referral),
            "job fair" | "jobfair" => Ok(Self::JobFair),
            "outsourcing" => Ok(Self::Outsourcing),
            _ => Err(PipelineError::invalid_category(trimmed)),
        }
    }
}

impl std::str::FromStr for RecruitmentStrategy {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl From<RecruitmentStrategy> for &'static str {
    fn from(strategy: RecruitmentStrategy) -> &'static str {
        strategy.label()
    }
}

impl std::fmt::Display for RecruitmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl<'de> Deserialize<'de> for RecruitmentStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // JSON input may carry the label ("Job Fair") or the code (2).
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u8),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Self::from_code(code).map_err(serde::de::Error::custom),
            Raw::Label(label) => Self::parse(&label).map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// DecisionStatus
// =============================================================================

/// Binary outcome of a prediction against the acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
    Accepted,
    Rejected,
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

// =============================================================================
// CandidateRecord
// =============================================================================

/// Raw candidate attributes as entered through the form or a batch CSV row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub education_level: EducationLevel,
    pub experience_years: u32,
    pub interview_score: u32,
    pub skill_score: u32,
    pub personality_score: u32,
    pub recruitment_strategy: RecruitmentStrategy,
}

impl CandidateRecord {
    /// Check the declared numeric ranges before feature building.
    ///
    /// The type system already rules out negatives and unknown categories;
    /// this enforces the upper bounds (experience 0–40, scores 0–100).
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.experience_years > MAX_EXPERIENCE_YEARS {
            return Err(PipelineError::out_of_range(
                "ExperienceYears",
                self.experience_years,
                MAX_EXPERIENCE_YEARS,
            ));
        }
        for (field, value) in [
            ("InterviewScore", self.interview_score),
            ("SkillScore", self.skill_score),
            ("PersonalityScore", self.personality_score),
        ] {
            if value > MAX_SCORE {
                return Err(PipelineError::out_of_range(field, value, MAX_SCORE));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn education_level_codes_round_trip() {
        for code in 1..=4u8 {
            let level = EducationLevel::try_from(code).unwrap();
            assert_eq!(level.code(), code);
            assert_eq!(level.as_feature(), f64::from(code));
        }
        assert!(EducationLevel::try_from(0).is_err());
        assert!(EducationLevel::try_from(5).is_err());
    }

    #[test]
    fn strategy_parses_labels_and_codes() {
        assert_eq!(
            RecruitmentStrategy::parse("Referral").unwrap(),
            RecruitmentStrategy::Referral
        );
        assert_eq!(
            RecruitmentStrategy::parse("  job fair ").unwrap(),
            RecruitmentStrategy::JobFair
        );
        assert_eq!(
            RecruitmentStrategy::parse("3").unwrap(),
            RecruitmentStrategy::Outsourcing
        );
    }

    #[test]
    fn strategy_rejects_unknown_values() {
        assert!(RecruitmentStrategy::parse("Campus").is_err());
        assert!(RecruitmentStrategy::parse("0").is_err());
        assert!(RecruitmentStrategy::parse("4").is_err());
        assert!(RecruitmentStrategy::parse("").is_err());
    }

    #[test]
    fn strategy_deserialises_from_label_or_code() {
        let from_label: RecruitmentStrategy = serde_json::from_str("\"Job Fair\"").unwrap();
        assert_eq!(from_label, RecruitmentStrategy::JobFair);

        let from_code: RecruitmentStrategy = serde_json::from_str("2").unwrap();
        assert_eq!(from_code, RecruitmentStrategy::JobFair);

        assert!(serde_json::from_str::<RecruitmentStrategy>("\"Campus\"").is_err());
        assert!(serde_json::from_str::<RecruitmentStrategy>("9").is_err());
    }

    #[test]
    fn one_hot_is_exclusive_for_all_strategies() {
        for strategy in [
            RecruitmentStrategy::Referral,
            RecruitmentStrategy::JobFair,
            RecruitmentStrategy::Outsourcing,
        ] {
            let encoding = strategy.one_hot();
            let sum: f64 = encoding.iter().sum();
            assert_eq!(sum, 1.0, "one-hot for {strategy} must sum to 1");
            assert_eq!(
                encoding[usize::from(strategy.code()) - 1],
                1.0,
                "indicator for {strategy} must sit at its own code position"
            );
        }
    }

    #[test]
    fn validate_enforces_declared_ranges() {
        let mut record = CandidateRecord {
            name: "Sari".to_string(),
            education_level: EducationLevel::Bachelor,
            experience_years: 5,
            interview_score: 70,
            skill_score: 80,
            personality_score: 75,
            recruitment_strategy: RecruitmentStrategy::Referral,
        };
        assert!(record.validate().is_ok());

        record.experience_years = 41;
        assert!(record.validate().is_err());

        record.experience_years = 40;
        record.skill_score = 101;
        assert!(record.validate().is_err());
    }
}
