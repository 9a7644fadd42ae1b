//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `auth`: Signup and login against the credential store
//! - `images`: Multipart upload and image listing
//! - `annotations`: Saving and listing bounding-box entries
//! - `health`: Liveness and readiness probes

pub mod annotations;
pub mod auth;
pub mod health;
pub mod images;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of every successful write that has nothing else to report
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// API version and base info
///
/// ```json
/// {
///   "name": "Annotator Server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Annotator Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/signup",
            "/login",
            "/upload",
            "/images",
            "/bounding-boxes",
            "/uploads/{file}",
            "/test",
            "/health",
            "/ready"
        ]
    }))
}

/// Connectivity check for the front end. Touches no storage.
pub async fn connection_test() -> Json<MessageResponse> {
    MessageResponse::new("Frontend successfully connected to backend")
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
