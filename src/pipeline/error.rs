// =============================================================================
// Pipeline error taxonomy
// =============================================================================
//
// Every failure mode the pipeline can surface to a user maps onto one of
// these variants.  Empty inputs (empty history, 0-row batch) are NOT errors —
// they are valid empty results and never reach this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Model or scaler artifact missing, unreadable, or inconsistent with the
    /// expected feature schema.  Detected at startup; prediction stays
    /// disabled for the process lifetime.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown RecruitmentStrategy label or code.  Strict policy: the record
    /// fails, it is never silently encoded as all-zero.
    #[error("unknown recruitment strategy '{value}'{}", row_suffix(.row))]
    InvalidCategory { value: String, row: Option<usize> },

    /// Batch file is structurally unusable: required column missing or a
    /// numeric column holds a non-numeric value.  Raised before any row is
    /// scored.
    #[error("schema error: {0}")]
    Schema(String),

    /// A numeric field is outside its declared range.
    #[error("{field} = {value} is out of range (0-{max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(n) => format!(" (row {n})"),
        None => String::new(),
    }
}

impl PipelineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_category(value: impl Into<String>) -> Self {
        Self::InvalidCategory {
            value: value.into(),
            row: None,
        }
    }

    /// Attach a 1-based data row number for batch diagnostics.
    pub fn invalid_category_at(value: impl Into<String>, row: usize) -> Self {
        Self::InvalidCategory {
            value: value.into(),
            row: Some(row),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn out_of_range(field: &'static str, value: u32, max: u32) -> Self {
        Self::OutOfRange { field, value, max }
    }

    /// True for errors that mean "prediction capability absent", which the
    /// API maps to 503 rather than 422.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
