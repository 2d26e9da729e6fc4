use axum::{
    extract::{Multipart, Query, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::games::form::{RawQuizForm, TopicInput};
use crate::api::guards::CurrentUser;
use crate::api::validation::ValidationIssue;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::game::{
    EndGameRequest, GameCreatedResponse, GameEnvelope, GameQuery, GameResponse,
    GameSummaryResponse, LimitQuery, QuestionResponse,
};
use crate::schemas::questions::QuestionsRequest;
use crate::services::ocr::OcrError;
use crate::services::option_shuffle::quiz_seed;
use crate::services::question_source::into_quiz;
use crate::services::quiz_builder::persist_quiz;
use crate::services::topic_text::normalize_topic;

const CREATE_FAILED: &str = "An unexpected error occurred on game.";
const DEFAULT_HISTORY_LIMIT: i64 = 10;

pub(super) async fn create_game(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GameCreatedResponse>, ApiError> {
    let environment = state.settings().runtime().environment;
    let max_file_bytes = state.settings().uploads().max_upload_size_bytes;

    let form = RawQuizForm::read(&mut multipart, max_file_bytes)
        .await?
        .validate(max_file_bytes)
        .map_err(ApiError::Validation)?;

    let field = form.input.field();
    let source = form.input.source_label();
    let services = state.services();

    let raw_text = match form.input {
        TopicInput::Text(text) => text,
        TopicInput::Document { kind, bytes } => services
            .documents
            .extract_text(kind, &bytes)
            .await
            .map_err(|err| ApiError::unexpected(&err, environment, CREATE_FAILED))?,
        TopicInput::Image(bytes) => {
            services.ocr.recognize(bytes).await.map_err(|err| match err {
                OcrError::QueueFull => ApiError::ServiceUnavailable(
                    "Image recognition is busy, try again shortly".to_string(),
                ),
                other => {
                    ApiError::unexpected(&anyhow::Error::from(other), environment, CREATE_FAILED)
                }
            })?
        }
    };

    let topic = normalize_topic(&raw_text);
    if topic.is_empty() {
        return Err(ApiError::Validation(vec![ValidationIssue::custom(
            &[field],
            "No usable text could be extracted from the topic",
        )]));
    }

    let request = QuestionsRequest {
        amount: form.amount,
        topic,
        difficulty: form.difficulty,
        language: form.language,
    };

    let quiz = services
        .questions
        .fetch_questions(&request)
        .await
        .and_then(|response| into_quiz(response, request.amount, &request.topic))
        .map_err(|err| {
            ApiError::unexpected(&anyhow::Error::from(err), environment, CREATE_FAILED)
        })?;

    let seed = quiz_seed(state.settings().questions().shuffle_seed);
    let persisted = persist_quiz(state.db(), &user.id, request.difficulty, quiz, seed)
        .await
        .map_err(|err| ApiError::unexpected(&err, environment, CREATE_FAILED))?;

    metrics::counter!("quizzes_created_total", "source" => source).increment(1);
    tracing::info!(
        game_id = %persisted.game.id,
        user_id = %user.id,
        source,
        question_count = persisted.question_count,
        topic_count = persisted.topic_count,
        "Game created"
    );

    Ok(Json(GameCreatedResponse { game_id: persisted.game.id }))
}

pub(super) async fn get_game(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let game_id = query
        .game_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("You must provide a game id.".to_string()))?;

    let game = repositories::games::find_by_id(state.db(), &game_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch game"))?
        .ok_or_else(|| ApiError::NotFound("Game not found.".to_string()))?;

    let questions = repositories::questions::list_by_game(state.db(), &game.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;

    Ok(Json(GameEnvelope {
        game: GameResponse {
            game: GameSummaryResponse::from_db(game),
            questions: questions.into_iter().map(QuestionResponse::from_db).collect(),
        },
    }))
}

pub(super) async fn list_games(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<GameSummaryResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let games = repositories::games::list_recent_by_user(state.db(), &user.id, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list games"))?;

    Ok(Json(games.into_iter().map(GameSummaryResponse::from_db).collect()))
}

pub(super) async fn end_game(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<EndGameRequest>,
) -> Result<Json<GameSummaryResponse>, ApiError> {
    let game = repositories::games::mark_ended(
        state.db(),
        &payload.game_id,
        &user.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to end game"))?
    .ok_or_else(|| ApiError::NotFound("Game not found.".to_string()))?;

    tracing::info!(game_id = %game.id, user_id = %user.id, "Game ended");
    Ok(Json(GameSummaryResponse::from_db(game)))
}
