use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::error::AppError;

/// Liveness: the process is up.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "kickback",
    }))
}

/// Readiness: the ledger database answers. A failed probe returns 500.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.repo.ping().await?;
    Ok(Json(serde_json::json!({"status": "ready"})))
}
