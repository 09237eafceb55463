//! Liveness endpoint. Not behind the access gate.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn health_routes() -> Router {
    Router::new().route("/api/health", get(health))
}
