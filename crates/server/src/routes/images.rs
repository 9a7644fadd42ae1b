use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use annotator::WorkflowError;
use axum::extract::multipart::Multipart;
use axum::extract::multipart::MultipartRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ingest::{IngestError, UploadedFile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::ImageRecord;

/// Multipart field that carries image files
pub const IMAGES_FIELD: &str = "images";

/// Response from a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(rename = "imageUrls")]
    pub image_urls: Vec<String>,
}

/// Upload up to `max_upload_files` images
///
/// Only file parts named `images` are stored; other parts are skipped. A
/// request that is not multipart at all counts as an upload with no files.
pub async fn upload_images(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<impl IntoResponse> {
    let files = match multipart {
        Ok(multipart) => collect_files(multipart).await?,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "upload without multipart body");
            Vec::new()
        }
    };

    let refs = annotator::upload_images(&state.ingestor, &state.stores.images, files)
        .await
        .map_err(upload_error)?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Images uploaded successfully".to_string(),
            image_urls: refs.into_iter().map(|r| r.url).collect(),
        }),
    ))
}

/// List every registered image with an absolute URL
pub async fn list_images(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<Vec<ImageRecord>>> {
    let images = state
        .stores
        .images
        .list_all()
        .await
        .map_err(|e| ServerError::internal("Error fetching images", e))?;

    Ok(Json(images))
}

async fn collect_files(mut multipart: Multipart) -> ServerResult<Vec<UploadedFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            tracing::debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;

        let mut file = UploadedFile::new(original_name, bytes);
        file.content_type = content_type;
        files.push(file);
    }
    Ok(files)
}

fn upload_error(err: WorkflowError) -> ServerError {
    if !err.is_client_error() {
        return ServerError::internal("Error uploading images", err);
    }
    match err {
        WorkflowError::Ingest(IngestError::TooManyFiles { max, .. }) => {
            ServerError::BadRequest(format!("Too many files: at most {max} allowed"))
        }
        _ => ServerError::BadRequest("No files uploaded".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::StoreError;

    #[test]
    fn upload_errors_map_to_public_messages() {
        let err = upload_error(WorkflowError::Ingest(IngestError::NoFiles));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No files uploaded");

        let err = upload_error(WorkflowError::Ingest(IngestError::TooManyFiles {
            max: 10,
            got: 12,
        }));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = upload_error(WorkflowError::Store(StoreError::backend("disk full")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error uploading images");
    }
}
