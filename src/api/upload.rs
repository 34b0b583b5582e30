//! Document upload endpoint
//!
//! `POST /api/upload` accepts multipart form data with a `file` field and
//! answers `{"text": "..."}` with the extracted document text.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::state::AppState;

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub text: String,
}

/// Extract text from an uploaded PDF, DOCX or PPTX file
///
/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().unwrap_or("-").to_string();
        let data = field.bytes().await?;

        tracing::info!(
            file_name = %file_name,
            content_type = %content_type,
            size = data.len(),
            "File uploaded"
        );

        let text = state
            .extraction
            .extract_upload(&content_type, data.to_vec())
            .await?;

        return Ok(Json(UploadResponse { text }));
    }

    Err(ApiError::MissingFile)
}
