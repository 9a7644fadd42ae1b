use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Touch the start time so uptime counts from boot, not the first probe
pub fn mark_server_start() {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
}

fn metadata() -> ServerMetadata {
    ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: SERVER_START_TIME
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0),
    }
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    let meta = metadata();
    Json(json!({
        "status": "healthy",
        "service": "annotator-server",
        "version": meta.version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": meta.uptime_seconds,
    }))
}

/// Readiness check endpoint
/// Returns 200 once the storage backend answers a ping, 503 otherwise
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let storage_ready = match state.stores.backend().ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "storage backend not ready");
            false
        }
    };
    let (status, label) = if storage_ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status,
        Json(json!({
            "status": label,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "components": {
                "storage": {
                    "backend": state.config.storage.kind(),
                    "ready": storage_ready,
                },
                "uploads": state.ingestor.config().content_root.is_dir(),
            },
            "metadata": metadata(),
        })),
    )
}
