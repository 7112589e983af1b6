//! Operational surface for the view-sync subsystem.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use tracing::info;

use super::state::HttpState;

/// `POST /admin/sync-now` — run a reconciliation cycle immediately.
///
/// Invokes the same routine as the scheduled job and returns its report
/// verbatim; a cycle already in flight finishes before this one starts.
pub async fn sync_now(State(state): State<HttpState>) -> impl IntoResponse {
    info!(target = "infra::http::admin", "manual view sync requested");
    let report = state.view_sync.run_cycle().await;
    Json(report)
}

/// `GET /admin/sync-status` — pending counters awaiting the next cycle.
pub async fn sync_status(State(state): State<HttpState>) -> impl IntoResponse {
    Json(state.view_sync.pending_status().await)
}
