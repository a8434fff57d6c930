pub mod boards;
pub mod cards;
pub mod columns;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
