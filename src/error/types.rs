//! API error types
//!
//! Every failure leaves the HTTP layer as a plain-text body.

use crate::services::extraction::ExtractionError;
use crate::services::generation::GenerationError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const NO_FILE_MESSAGE: &str = "No file uploaded.";
pub const UNSUPPORTED_FILE_MESSAGE: &str = "Unsupported file type.";
pub const EXTRACTION_FAILED_MESSAGE: &str = "Error processing file.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Body could not be read as multipart form data
    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("{}", NO_FILE_MESSAGE)]
    MissingFile,

    #[error("{}", UNSUPPORTED_FILE_MESSAGE)]
    UnsupportedFile,

    /// Extraction failed; the detail is logged, not returned
    #[error("{}", EXTRACTION_FAILED_MESSAGE)]
    Extraction(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::MissingFile | ApiError::UnsupportedFile => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Multipart(err) => err.status(),
            ApiError::Extraction(_) | ApiError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(_) => ApiError::UnsupportedFile,
            other => ApiError::Extraction(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Extraction(detail) => {
                tracing::error!(error = %detail, "Error processing uploaded file");
            }
            ApiError::Generation(err) => {
                tracing::error!(error = %err, "Generation request failed");
            }
            _ => {}
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
