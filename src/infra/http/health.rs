use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use super::state::HttpState;

pub async fn root(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({ "app": state.app_name, "status": "ok" }))
}

/// Shallow health report: one cheap probe per backing store.
pub async fn health(State(state): State<HttpState>) -> impl IntoResponse {
    let database = state.db.health_check().await.is_ok();
    let counter_store = state.kv.get("health:probe").await.is_ok();

    Json(json!({
        "app": state.app_name,
        "database": database,
        "counter_store": counter_store,
        "status": if database && counter_store { "ok" } else { "degraded" },
    }))
}
