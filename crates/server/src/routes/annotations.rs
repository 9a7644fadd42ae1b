use super::MessageResponse;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use store::{BoundingBoxEntry, NewBoundingBoxEntry};

/// Save one bounding-box entry
///
/// Accepts `imgUrls` (array or single string) or `imageUrl`, plus
/// `boundingBoxes`. Shapes are stored as sent.
pub async fn save_bounding_boxes(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<NewBoundingBoxEntry>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(entry) = payload?;

    state
        .stores
        .annotations
        .save(entry.image_urls, entry.bounding_boxes)
        .await
        .map_err(|e| ServerError::internal("Error saving bounding boxes", e))?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Bounding boxes saved successfully"),
    ))
}

/// List every stored bounding-box entry
pub async fn list_bounding_boxes(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<Vec<BoundingBoxEntry>>> {
    let entries = state
        .stores
        .annotations
        .list_all()
        .await
        .map_err(|e| ServerError::internal("Error fetching bounding boxes", e))?;

    Ok(Json(entries))
}
