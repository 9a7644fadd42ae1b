use super::MessageResponse;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use store::AuthOutcome;

/// Signup and login body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account
///
/// Duplicate emails are accepted and create a separate record.
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;

    state
        .stores
        .credentials
        .register(&request.email, &request.password)
        .await
        .map_err(|e| ServerError::internal("Internal server error", e))?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully"),
    ))
}

/// Check an email/password pair. No session or token is issued.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;

    let outcome = state
        .stores
        .credentials
        .authenticate(&request.email, &request.password)
        .await
        .map_err(|e| ServerError::internal("Internal server error", e))?;

    match outcome {
        AuthOutcome::Authenticated => Ok(MessageResponse::new("Login successful")),
        AuthOutcome::NotFound => Err(ServerError::BadRequest("User not found".to_string())),
        AuthOutcome::InvalidCredentials => {
            Err(ServerError::BadRequest("Invalid credentials".to_string()))
        }
    }
}
