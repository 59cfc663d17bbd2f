use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /health : liveness plus a store round-trip.
pub async fn health(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    if let Err(e) = app.store.ping().await {
        tracing::warn!(error = %e, "health check failed");
        return Err(AppError::unavailable(format!("store unavailable: {e}")));
    }
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
