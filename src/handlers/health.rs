//! Health check endpoint for deployment probes.

use axum::Json;
use serde_json::{Value, json};

/// `GET /` - liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
