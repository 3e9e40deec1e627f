use axum::{
    Json,
    extract::{Multipart, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UploadResponse};

const FILE_FIELD: &str = "file";

/// POST /upload
/// Multipart form with a single `file` field
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::validation(format!("Failed to read uploaded file: {e}"))
        })?;

        let stored = state
            .image_service()
            .store_upload(&filename, content_type.as_deref(), bytes.to_vec())
            .await?;

        return Ok(Json(ApiResponse::success(UploadResponse {
            message: "Upload successful".to_string(),
            url: stored.url,
            filename: stored.filename,
        })));
    }

    Err(ApiError::validation("No file uploaded"))
}
