//! Study action endpoints
//!
//! The browser front end picks an action and a learning style; these
//! handlers build the matching prompt and run it through the same
//! generation path as `/api/generate`.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::generate::{not_blank, validation_message};
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::services::prompts::{build_prompt, StudyAction, LEARNING_STYLES};

/// Request body for `/api/study`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudyRequest {
    /// One of summarize, questions, explain, flashcards, problems, solve-math
    pub action: String,

    #[validate(custom(function = "not_blank"))]
    pub text: String,

    #[serde(default)]
    pub learning_style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LearningStylesResponse {
    pub styles: Vec<&'static str>,
    pub actions: Vec<&'static str>,
}

/// Run a study action over the submitted text
///
/// POST /api/study
pub async fn study(
    State(state): State<AppState>,
    payload: Result<Json<StudyRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = payload?;
    let action: StudyAction = request
        .action
        .parse()
        .map_err(|e: anyhow::Error| ApiError::InvalidRequest(e.to_string()))?;
    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(validation_message(&e)))?;

    let prompt = build_prompt(action, request.learning_style.as_deref(), &request.text);

    tracing::debug!(
        action = %action,
        learning_style = %request.learning_style.as_deref().unwrap_or("-"),
        "Study action requested"
    );

    let text = state.generation.generate(&prompt).await?;
    Ok(text)
}

/// List the preset learning styles and available actions
///
/// GET /api/learning-styles
pub async fn learning_styles() -> Json<LearningStylesResponse> {
    Json(LearningStylesResponse {
        styles: LEARNING_STYLES.to_vec(),
        actions: StudyAction::ALL.iter().map(StudyAction::as_str).collect(),
    })
}
