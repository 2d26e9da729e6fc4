use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::validation::{validate_payload, ValidationIssue};
use crate::core::state::AppState;
use crate::schemas::questions::{QuestionsRequest, QuestionsResponse};
use crate::services::question_source::INTERNAL_TOKEN_HEADER;

const GENERATION_FAILED: &str = "An unexpected error occurred on questions.";

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/questions", post(generate_questions))
}

/// Takes the body as loose JSON so shape errors come back as validation issues.
async fn generate_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    if let Some(expected) = &state.settings().questions().api_token {
        let provided = headers.get(INTERNAL_TOKEN_HEADER).and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(ApiError::Unauthorized("Invalid internal token"));
        }
    }

    let request: QuestionsRequest = serde_json::from_value(body).map_err(|err| {
        ApiError::Validation(vec![ValidationIssue::new("invalid_type", &[], err.to_string())])
    })?;
    validate_payload(&request)?;

    let environment = state.settings().runtime().environment;
    let response = state
        .services()
        .generator
        .generate(&request)
        .await
        .map_err(|err| ApiError::unexpected(&err, environment, GENERATION_FAILED))?;

    tracing::info!(
        amount = request.amount,
        questions = response.questions.len(),
        "Questions generated"
    );

    Ok(Json(response))
}
