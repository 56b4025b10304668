// =============================================================================
// Central Application State — Pancarona Recruitment Engine
// =============================================================================
//
// The single source of truth for the engine.  AppState ties the loaded model
// bundle, the prediction history, and the last batch summary together and
// provides a unified snapshot for the dashboard API and WebSocket feed.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
//   - The model bundle is immutable after startup and shared via Arc.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::artifacts::ModelBundle;
use crate::batch::BatchSummary;
use crate::engine_config::EngineConfig;
use crate::history::HistoryStore;
use crate::pipeline::decision::{DecisionRecord, ACCEPT_THRESHOLD};
use crate::types::DecisionStatus;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter.  Incremented on every
    /// meaningful state mutation; the WebSocket feed uses it to detect
    /// changes and push updates.
    pub state_version: AtomicU64,

    /// WebSocket message sequence number (incremented per message sent).
    pub ws_sequence_number: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub engine_config: Arc<RwLock<EngineConfig>>,

    // ── Prediction capability ───────────────────────────────────────────
    /// Loaded once at startup; `None` means both scoring endpoints stay
    /// disabled for the process lifetime.
    pub bundle: Option<Arc<ModelBundle>>,
    /// Why prediction is disabled, when it is.
    pub disabled_reason: RwLock<Option<String>>,

    // ── History & Batches ───────────────────────────────────────────────
    pub history: Arc<HistoryStore>,
    pub last_batch: RwLock<Option<BatchSummary>>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the engine was started.  Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct a new `AppState`.  `bundle` is `None` when either artifact
    /// failed to load; `disabled_reason` then records why.
    pub fn new(
        config: EngineConfig,
        bundle: Option<ModelBundle>,
        history: HistoryStore,
        disabled_reason: Option<String>,
    ) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            ws_sequence_number: AtomicU64::new(0),
            engine_config: Arc::new(RwLock::new(config)),
            bundle: bundle.map(Arc::new),
            disabled_reason: RwLock::new(disabled_reason),
            history: Arc::new(history),
            last_batch: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version.  Call this after every
    /// meaningful mutation to signal WebSocket clients that fresh data is
    /// available.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Capability ──────────────────────────────────────────────────────

    /// True when both artifacts loaded and prediction is available.
    pub fn prediction_ready(&self) -> bool {
        self.bundle.is_some()
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message.  The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }

        self.increment_version();
    }

    // ── Batch Summary ───────────────────────────────────────────────────

    /// Remember the descriptive summary of the most recent batch.
    pub fn set_last_batch(&self, summary: BatchSummary) {
        *self.last_batch.write() = Some(summary);
        self.increment_version();
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build a complete, serialisable snapshot of the engine state.
    ///
    /// This is the payload sent to the dashboard via the REST
    /// `GET /api/v1/state` endpoint and the WebSocket push feed.
    pub fn build_snapshot(&self) -> StateSnapshot {
        let version = self.current_state_version();
        let history = self.history.snapshot();

        let history_stats = if history.is_empty() {
            None
        } else {
            let total = history.len();
            let accepted = history
                .iter()
                .filter(|r| r.status == DecisionStatus::Accepted)
                .count();
            let mean_probability =
                history.iter().map(|r| r.probability).sum::<f64>() / total as f64;

            Some(HistoryStats {
                total,
                accepted,
                rejected: total - accepted,
                mean_probability,
            })
        };

        // ── Engine config summary ───────────────────────────────────
        let config = self.engine_config.read();
        let engine_config = EngineConfigSummary {
            model_path: config.model_path.clone(),
            scaler_path: config.scaler_path.clone(),
            history_path: config.history_path.clone(),
        };

        StateSnapshot {
            state_version: version,
            server_time: Utc::now().timestamp_millis(),
            prediction_ready: self.prediction_ready(),
            disabled_reason: self.disabled_reason.read().clone(),
            accept_threshold: ACCEPT_THRESHOLD,
            uptime_s: self.start_time.elapsed().as_secs(),
            engine_config,
            history,
            history_stats,
            last_batch: self.last_batch.read().clone(),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}

// =============================================================================
// Serialisable snapshot types (match the dashboard StateSnapshot interface)
// =============================================================================

/// Full engine state snapshot sent to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub prediction_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
    pub accept_threshold: f64,
    pub uptime_s: u64,
    pub engine_config: EngineConfigSummary,
    pub history: Vec<DecisionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_stats: Option<HistoryStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_batch: Option<BatchSummary>,
    pub recent_errors: Vec<ErrorRecord>,
}

/// Summary of the engine config for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfigSummary {
    pub model_path: String,
    pub scaler_path: String,
    pub history_path: String,
}

/// Aggregate statistics over the prediction history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub mean_probability: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decision::Decision;

    fn state_without_model(dir: &std::path::Path) -> AppState {
        let history = HistoryStore::load(dir.join("history.csv")).unwrap();
        AppState::new(
            EngineConfig::default(),
            None,
            history,
            Some("model artifact missing".to_string()),
        )
    }

    #[test]
    fn version_increments_monotonically() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_without_model(dir.path());

        let before = state.current_state_version();
        state.increment_version();
        state.increment_version();
        assert_eq!(state.current_state_version(), before + 2);
    }

    #[test]
    fn error_ring_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_without_model(dir.path());

        for i in 0..60 {
            state.push_error(format!("error {i}"));
        }

        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors.first().unwrap().message, "error 10");
        assert_eq!(errors.last().unwrap().message, "error 59");
    }

    #[test]
    fn snapshot_reports_disabled_capability() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_without_model(dir.path());

        let snapshot = state.build_snapshot();
        assert!(!snapshot.prediction_ready);
        assert_eq!(
            snapshot.disabled_reason.as_deref(),
            Some("model artifact missing")
        );
        assert_eq!(snapshot.accept_threshold, 61.0);
        assert_eq!(snapshot.engine_config.model_path, "model.json");
        assert!(snapshot.history.is_empty());
        assert!(snapshot.history_stats.is_none());
    }

    #[test]
    fn snapshot_aggregates_history_stats() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_without_model(dir.path());

        state
            .history
            .append(DecisionRecord::new(
                "Sari",
                Decision {
                    probability: 80.0,
                    status: DecisionStatus::Accepted,
                },
            ))
            .unwrap();
        state
            .history
            .append(DecisionRecord::new(
                "Budi",
                Decision {
                    probability: 40.0,
                    status: DecisionStatus::Rejected,
                },
            ))
            .unwrap();

        let stats = state.build_snapshot().history_stats.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 1);
        assert!((stats.mean_probability - 60.0).abs() < 1e-12);
    }
}
