// Server related imports
use axum::{extract::Json, response::IntoResponse};

// General imports
use chrono::Utc;
use serde_json::json;

/// Liveness endpoint; independent of the document store
pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "OK", "timestamp": Utc::now()}))
}
