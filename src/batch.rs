// =============================================================================
// Batch Scoring — bulk CSV upload through the prediction pipeline
// =============================================================================
//
// Contract (the order is fixed, not a suggestion):
//   1. Header check — every required column must be present, else the whole
//      file is rejected before any row is touched.
//   2. Row validation — every row is parsed and range-checked up front; the
//      first bad row fails the batch.  No partial scoring.
//   3. Scoring — each validated row runs the same two-stage pipeline as a
//      single prediction (embarrassingly parallel, executed sequentially).
//   4. Output — the input columns verbatim, with Probability and Status
//      appended, plus a descriptive summary for the dashboard charts.
//
// A byte-empty upload and a 0-row file with correct headers are both valid
// empty batches, not errors.
// =============================================================================

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::artifacts::ModelBundle;
use crate::pipeline::decision::Decision;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::types::{CandidateRecord, DecisionStatus, EducationLevel, RecruitmentStrategy};

/// Columns a batch file must carry, in any order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Name",
    "EducationLevel",
    "ExperienceYears",
    "InterviewScore",
    "SkillScore",
    "PersonalityScore",
    "RecruitmentStrategy",
];

/// Number of buckets in the probability histogram (10-point bins).
pub const HISTOGRAM_BINS: usize = 10;

// =============================================================================
// Results
// =============================================================================

/// Descriptive statistics over one scored batch, the data behind the
/// dashboard's status pie and probability histogram.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Counts per 10-point probability bucket; 100.0 lands in the last one.
    pub probability_histogram: [usize; HISTOGRAM_BINS],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_probability: Option<f64>,
    /// ISO 8601 timestamp.
    pub generated_at: String,
}

/// A fully scored batch, ready to render as the download artifact.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    headers: csv::StringRecord,
    raw_rows: Vec<csv::StringRecord>,
    pub decisions: Vec<Decision>,
    pub summary: BatchSummary,
}

impl ScoredBatch {
    /// Render the output CSV: every input column, then Probability, Status.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = self.headers.clone();
        header.push_field("Probability");
        header.push_field("Status");
        writer.write_record(&header)?;

        for (row, decision) in self.raw_rows.iter().zip(self.decisions.iter()) {
            let mut out = row.clone();
            out.push_field(&decision.probability.to_string());
            out.push_field(&decision.status.to_string());
            writer.write_record(&out)?;
        }

        writer
            .into_inner()
            .context("failed to flush batch CSV buffer")
    }
}

// =============================================================================
// Processing
// =============================================================================

/// Parse, validate, and score a batch CSV in one pass.
pub fn process_batch(csv_text: &str, bundle: &ModelBundle) -> PipelineResult<ScoredBatch> {
    // Byte-empty upload: a valid empty batch with the canonical columns.
    if csv_text.trim().is_empty() {
        let headers = csv::StringRecord::from(REQUIRED_COLUMNS.to_vec());
        return Ok(ScoredBatch {
            headers,
            raw_rows: Vec::new(),
            decisions: Vec::new(),
            summary: summarise(&[]),
        });
    }

    let (headers, raw_rows, records) = parse_batch(csv_text)?;

    let mut decisions = Vec::with_capacity(records.len());
    for record in &records {
        decisions.push(bundle.score(record)?);
    }

    let summary = summarise(&decisions);

    Ok(ScoredBatch {
        headers,
        raw_rows,
        decisions,
        summary,
    })
}

/// Validate headers and rows; returns the raw rows (for output rendering)
/// and the typed records (for scoring).  Fails before any row is scored.
fn parse_batch(
    csv_text: &str,
) -> PipelineResult<(csv::StringRecord, Vec<csv::StringRecord>, Vec<CandidateRecord>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::schema(format!("unreadable header row: {e}")))?
        .clone();

    // ── 1. Header check ─────────────────────────────────────────────────
    let mut column_index = std::collections::HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        column_index.insert(name.to_string(), idx);
    }
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !column_index.contains_key(*col))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let col = |name: &str| column_index[name];

    // ── 2. Row validation, all rows before any scoring ──────────────────
    let mut raw_rows = Vec::new();
    let mut records = Vec::new();

    for (idx, row) in reader.records().enumerate() {
        let row_number = idx + 1; // 1-based data row, header excluded
        let row =
            row.map_err(|e| PipelineError::schema(format!("row {row_number}: {e}")))?;

        let field = |name: &str| row.get(col(name)).unwrap_or("");

        let education_code = parse_numeric::<u8>(field("EducationLevel"), "EducationLevel", row_number)?;
        let education_level = EducationLevel::try_from(education_code)
            .map_err(|e| PipelineError::schema(format!("row {row_number}: {e}")))?;

        let record = CandidateRecord {
            name: field("Name").to_string(),
            education_level,
            experience_years: parse_numeric(field("ExperienceYears"), "ExperienceYears", row_number)?,
            interview_score: parse_numeric(field("InterviewScore"), "InterviewScore", row_number)?,
            skill_score: parse_numeric(field("SkillScore"), "SkillScore", row_number)?,
            personality_score: parse_numeric(field("PersonalityScore"), "PersonalityScore", row_number)?,
            recruitment_strategy: parse_strategy(field("RecruitmentStrategy"), row_number)?,
        };

        record.validate().map_err(|e| match e {
            // Strict policy: range violations fail the batch with the row named.
            PipelineError::OutOfRange { .. } => {
                PipelineError::schema(format!("row {row_number}: {e}"))
            }
            other => other,
        })?;

        raw_rows.push(row);
        records.push(record);
    }

    Ok((headers, raw_rows, records))
}

fn parse_numeric<T: std::str::FromStr>(
    raw: &str,
    column: &str,
    row_number: usize,
) -> PipelineResult<T> {
    raw.parse::<T>().map_err(|_| {
        PipelineError::schema(format!(
            "row {row_number}: non-numeric value '{raw}' in column {column}"
        ))
    })
}

fn parse_strategy(raw: &str, row_number: usize) -> PipelineResult<RecruitmentStrategy> {
    RecruitmentStrategy::parse(raw)
        .map_err(|_| PipelineError::invalid_category_at(raw, row_number))
}

fn summarise(decisions: &[Decision]) -> BatchSummary {
    let accepted = decisions
        .iter()
        .filter(|d| d.status == DecisionStatus::Accepted)
        .count();

    let mut probability_histogram = [0usize; HISTOGRAM_BINS];
    for decision in decisions {
        let bin = ((decision.probability / 10.0) as usize).min(HISTOGRAM_BINS - 1);
        probability_histogram[bin] += 1;
    }

    let mean_probability = if decisions.is_empty() {
        None
    } else {
        Some(decisions.iter().map(|d| d.probability).sum::<f64>() / decisions.len() as f64)
    };

    BatchSummary {
        total: decisions.len(),
        accepted,
        rejected: decisions.len() - accepted,
        probability_histogram,
        mean_probability,
        generated_at: Utc::now().to_rfc3339(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::classifier::ExportedClassifier;
    use crate::artifacts::scaler::ScalingTransform;
    use crate::pipeline::features::FEATURE_COUNT;

    /// Bundle whose classifier always accepts (large positive intercept).
    fn accepting_bundle() -> ModelBundle {
        ModelBundle {
            scaler: ScalingTransform::identity(),
            classifier: ExportedClassifier::new([0.0; FEATURE_COUNT], 10.0),
        }
    }

    /// Bundle whose classifier sits at exactly 50%.
    fn neutral_bundle() -> ModelBundle {
        ModelBundle {
            scaler: ScalingTransform::identity(),
            classifier: ExportedClassifier::new([0.0; FEATURE_COUNT], 0.0),
        }
    }

    const VALID_CSV: &str = "\
Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy
Sari,2,5,70,80,75,Referral
Budi,3,10,55,60,65,Job Fair
";

    #[test]
    fn valid_batch_scores_every_row() {
        let batch = process_batch(VALID_CSV, &accepting_bundle()).unwrap();
        assert_eq!(batch.decisions.len(), 2);
        assert_eq!(batch.summary.total, 2);
        assert_eq!(batch.summary.accepted, 2);
        assert_eq!(batch.summary.rejected, 0);
    }

    #[test]
    fn output_appends_probability_and_status_columns() {
        let batch = process_batch(VALID_CSV, &accepting_bundle()).unwrap();
        let text = String::from_utf8(batch.to_csv_bytes().unwrap()).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy,Probability,Status"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Sari,2,5,70,80,75,Referral,"));
        assert!(first.ends_with(",Accepted"));
    }

    #[test]
    fn missing_required_column_fails_before_scoring() {
        let csv_text = "\
Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore
Sari,2,5,70,80,75
";
        let err = process_batch(csv_text, &accepting_bundle()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(err.to_string().contains("RecruitmentStrategy"));
    }

    #[test]
    fn non_numeric_value_fails_with_row_and_column() {
        let csv_text = "\
Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy
Sari,2,five,70,80,75,Referral
";
        let err = process_batch(csv_text, &accepting_bundle()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 1"));
        assert!(message.contains("ExperienceYears"));
    }

    #[test]
    fn unknown_strategy_fails_the_batch_with_the_row_number() {
        let csv_text = "\
Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy
Sari,2,5,70,80,75,Referral
Budi,3,10,55,60,65,Campus
";
        let err = process_batch(csv_text, &accepting_bundle()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidCategory { row: Some(2), .. }
        ));
    }

    #[test]
    fn out_of_range_row_fails_the_batch() {
        let csv_text = "\
Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy
Sari,2,5,70,250,75,Referral
";
        let err = process_batch(csv_text, &accepting_bundle()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(err.to_string().contains("SkillScore"));
    }

    #[test]
    fn zero_row_file_with_correct_headers_is_a_valid_empty_batch() {
        let csv_text = "Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy\n";
        let batch = process_batch(csv_text, &accepting_bundle()).unwrap();

        assert!(batch.decisions.is_empty());
        assert_eq!(batch.summary.total, 0);
        assert!(batch.summary.mean_probability.is_none());

        let text = String::from_utf8(batch.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(
            text.trim(),
            "Name,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy,Probability,Status"
        );
    }

    #[test]
    fn byte_empty_upload_is_a_valid_empty_batch() {
        let batch = process_batch("  \n ", &accepting_bundle()).unwrap();
        assert_eq!(batch.summary.total, 0);
    }

    #[test]
    fn extra_columns_are_preserved_in_the_output() {
        let csv_text = "\
Name,Department,EducationLevel,ExperienceYears,InterviewScore,SkillScore,PersonalityScore,RecruitmentStrategy
Sari,Finance,2,5,70,80,75,Referral
";
        let batch = process_batch(csv_text, &accepting_bundle()).unwrap();
        let text = String::from_utf8(batch.to_csv_bytes().unwrap()).unwrap();
        assert!(text.lines().next().unwrap().starts_with("Name,Department,"));
        assert!(text.contains("Sari,Finance,2,"));
    }

    #[test]
    fn summary_histogram_buckets_probabilities() {
        let batch = process_batch(VALID_CSV, &neutral_bundle()).unwrap();
        // Both rows sit at exactly 50% with the neutral classifier.
        assert_eq!(batch.summary.probability_histogram[5], 2);
        assert_eq!(batch.summary.accepted, 0);
        assert_eq!(batch.summary.rejected, 2);
        assert!((batch.summary.mean_probability.unwrap() - 50.0).abs() < 1e-12);
    }
}
