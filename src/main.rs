// =============================================================================
// Pancarona Recruit Engine — Main Entry Point
// =============================================================================
//
// Loads the pre-trained classifier and scaler artifacts, restores the
// prediction history, and serves the dashboard API.  If either artifact is
// missing the engine still starts, with prediction disabled for the whole
// process lifetime.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod artifacts;
mod batch;
mod engine_config;
mod history;
mod pipeline;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::artifacts::ModelBundle;
use crate::engine_config::EngineConfig;
use crate::history::HistoryStore;
use crate::pipeline::decision::ACCEPT_THRESHOLD;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Pancarona Recruit Engine — Starting Up           ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = EngineConfig::load("engine_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Override bind address from env if available.
    if let Ok(addr) = std::env::var("PANCARONA_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        model = %config.model_path,
        scaler = %config.scaler_path,
        history = %config.history_path,
        threshold = ACCEPT_THRESHOLD,
        "engine configured"
    );

    // ── 2. Load artifacts (capability is all-or-nothing) ─────────────────
    let (bundle, disabled_reason) =
        match ModelBundle::load(&config.model_path, &config.scaler_path) {
            Ok(bundle) => (Some(bundle), None),
            Err(e) => {
                warn!(error = %e, "Model or scaler artifact unavailable — prediction disabled");
                (None, Some(e.to_string()))
            }
        };

    // ── 3. Restore history ───────────────────────────────────────────────
    let history = HistoryStore::load(&config.history_path)
        .context("prediction history is unreadable; refusing to overwrite it")?;

    // ── 4. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, bundle, history, disabled_reason));

    if let Some(reason) = state.disabled_reason.read().clone() {
        state.push_error(reason);
    }

    // ── 5. Serve the API ─────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await?;

    info!("Pancarona Recruit Engine shut down complete.");
    Ok(())
}
