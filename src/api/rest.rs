// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  This is a single-user local tool, so
// there is no authentication layer; CORS is configured permissively so the
// dashboard dev server can talk to the engine.
//
// Prediction endpoints gate on model availability: when either artifact
// failed to load at startup they answer 503 with the recorded reason, and
// the pipeline is never invoked.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::artifacts::ModelBundle;
use crate::batch::process_batch;
use crate::pipeline::decision::DecisionRecord;
use crate::pipeline::error::PipelineError;
use crate::types::{CandidateRecord, DecisionStatus};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/batch", post(score_batch))
        .route("/api/v1/batch/summary", get(batch_summary))
        .route("/api/v1/history", get(history_list))
        .route("/api/v1/history", delete(history_clear))
        .route("/api/v1/history/download", get(history_download))
        .route("/api/v1/history/:index", delete(history_delete))
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Map a pipeline error onto the HTTP surface: configuration errors mean the
/// capability is absent (503), everything else is bad input (422).
fn pipeline_error_response(err: &PipelineError) -> Response {
    let status = if err.is_configuration() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// 503 response for requests arriving while prediction is disabled.
fn capability_absent_response(state: &AppState) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "prediction is disabled: model or scaler artifact unavailable",
            "disabled_reason": state.disabled_reason.read().clone(),
        })),
    )
        .into_response()
}

/// The loaded bundle, or `None` while prediction is disabled.
fn bundle(state: &AppState) -> Option<Arc<ModelBundle>> {
    state.bundle.clone()
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    prediction_ready: bool,
    state_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        prediction_ready: state.prediction_ready(),
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Full state snapshot
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.build_snapshot();
    Json(snapshot)
}

// =============================================================================
// Single prediction
// =============================================================================

#[derive(Serialize)]
struct PredictResponse {
    name: String,
    /// Acceptance probability as a 0–100 percentage.
    probability: f64,
    status: DecisionStatus,
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<CandidateRecord>,
) -> Response {
    let Some(bundle) = bundle(&state) else {
        return capability_absent_response(&state);
    };

    let decision = match bundle.score(&record) {
        Ok(decision) => decision,
        Err(e) => return pipeline_error_response(&e),
    };

    let history_entry = DecisionRecord::new(record.name.clone(), decision);
    if let Err(e) = state.history.append(history_entry) {
        state.push_error(format!("failed to persist history: {e}"));
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "failed to persist history" })),
        )
            .into_response();
    }
    state.increment_version();

    info!(
        name = %record.name,
        probability = decision.probability,
        status = %decision.status,
        "prediction recorded"
    );

    Json(PredictResponse {
        name: record.name,
        probability: decision.probability,
        status: decision.status,
    })
    .into_response()
}

// =============================================================================
// Batch scoring
// =============================================================================

async fn score_batch(State(state): State<Arc<AppState>>, body: String) -> Response {
    let Some(bundle) = bundle(&state) else {
        return capability_absent_response(&state);
    };

    let batch = match process_batch(&body, &bundle) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "batch rejected");
            return pipeline_error_response(&e);
        }
    };

    let csv_bytes = match batch.to_csv_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            state.push_error(format!("failed to render batch output: {e}"));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to render batch output" })),
            )
                .into_response();
        }
    };

    info!(
        rows = batch.summary.total,
        accepted = batch.summary.accepted,
        rejected = batch.summary.rejected,
        "batch scored"
    );
    state.set_last_batch(batch.summary.clone());

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"scored_candidates.csv\"",
            ),
        ],
        csv_bytes,
    )
        .into_response()
}

async fn batch_summary(State(state): State<Arc<AppState>>) -> Response {
    match state.last_batch.read().clone() {
        Some(summary) => Json(summary).into_response(),
        None => Json(serde_json::json!({
            "batch": null,
            "message": "No batch scored yet",
        }))
        .into_response(),
    }
}

// =============================================================================
// History
// =============================================================================

async fn history_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.history.snapshot())
}

async fn history_download(State(state): State<Arc<AppState>>) -> Response {
    match state.history.to_csv_bytes() {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"history.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            state.push_error(format!("failed to render history download: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to render history download" })),
            )
                .into_response()
        }
    }
}

async fn history_delete(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    match state.history.remove(index) {
        Ok(removed) => {
            state.increment_version();
            Json(serde_json::json!({
                "deleted": removed.name,
                "remaining": state.history.len(),
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn history_clear(State(state): State<Arc<AppState>>) -> Response {
    match state.history.clear() {
        Ok(()) => {
            state.increment_version();
            Json(serde_json::json!({ "cleared": true })).into_response()
        }
        Err(e) => {
            state.push_error(format!("failed to clear history: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to clear history" })),
            )
                .into_response()
        }
    }
}
