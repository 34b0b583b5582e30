//! Prompt generation endpoint
//!
//! `POST /api/generate` takes `{"prompt": "..."}` and answers with the
//! sanitized plain-text completion.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::server::state::AppState;

/// Request body for `/api/generate`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Turn validation failures into a single readable message
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{} {}", field, reason)
        })
        .collect();
    fields.sort();
    format!("Invalid request: {}", fields.join(", "))
}

/// Generate text for a free-form prompt
///
/// POST /api/generate
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(validation_message(&e)))?;

    tracing::debug!(prompt_len = request.prompt.len(), "Generation requested");

    let text = state.generation.generate(&request.prompt).await?;
    Ok(text)
}
