// =============================================================================
// Run History — CSV-backed log of past predictions
// =============================================================================
//
// Append-only {Name, Probability, Status} records.  The file is read once at
// startup and rewritten in full (atomic tmp + rename) on every append,
// delete, or clear — there is no incremental write guarantee, which is
// acceptable for a single-user local tool.
//
// A missing or empty history file is a valid empty history, not an error.
//
// Thread-safety: the in-memory copy lives behind `parking_lot::RwLock`;
// mutation methods hold the write lock across the file rewrite so the file
// always reflects the in-memory order.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::pipeline::decision::DecisionRecord;

/// Header row written when the history is empty (serde-derived otherwise).
const HISTORY_COLUMNS: [&str; 3] = ["Name", "Probability", "Status"];

/// Thread-safe owner of the persisted prediction history.
pub struct HistoryStore {
    path: PathBuf,
    records: RwLock<Vec<DecisionRecord>>,
}

impl HistoryStore {
    /// Load the history from `path`.  A missing file or an empty/headers-only
    /// file yields an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = if path.exists() {
            read_records(&path)
                .with_context(|| format!("failed to load history from {}", path.display()))?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), entries = records.len(), "history loaded");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Current records in append order.
    pub fn snapshot(&self) -> Vec<DecisionRecord> {
        self.records.read().clone()
    }

    /// Append one record and rewrite the file.
    pub fn append(&self, record: DecisionRecord) -> Result<()> {
        let mut records = self.records.write();
        records.push(record);
        self.persist(&records)
    }

    /// Remove the record at `index` (current history order) and rewrite.
    pub fn remove(&self, index: usize) -> Result<DecisionRecord> {
        let mut records = self.records.write();
        if index >= records.len() {
            bail!(
                "history index {index} out of bounds (len {})",
                records.len()
            );
        }
        let removed = records.remove(index);
        self.persist(&records)?;
        info!(name = %removed.name, index, "history entry deleted");
        Ok(removed)
    }

    /// Drop every record and rewrite.
    pub fn clear(&self) -> Result<()> {
        let mut records = self.records.write();
        let dropped = records.len();
        records.clear();
        self.persist(&records)?;
        warn!(dropped, "history cleared");
        Ok(())
    }

    /// Render the current history as a downloadable CSV artifact.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        render_csv(&self.records.read())
    }

    /// Rewrite the whole file atomically (tmp + rename).
    fn persist(&self, records: &[DecisionRecord]) -> Result<()> {
        let content = render_csv(records)?;
        let tmp_path = self.path.with_extension("csv.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp history to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp history to {}", self.path.display()))?;

        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<DecisionRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

fn render_csv(records: &[DecisionRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        // serde only emits headers alongside a first record; keep the file
        // self-describing even when empty.
        writer.write_record(HISTORY_COLUMNS)?;
    } else {
        for record in records {
            writer.serialize(record)?;
        }
    }
    Ok(writer
        .into_inner()
        .context("failed to flush history CSV buffer")?)
}
