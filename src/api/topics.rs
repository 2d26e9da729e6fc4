use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::game::{LimitQuery, TopicCountResponse};

const DEFAULT_TOPIC_LIMIT: i64 = 20;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/topics", get(list_topics))
}

async fn list_topics(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TopicCountResponse>>, ApiError> {
    let rows = repositories::topic_counts::list_popular(
        state.db(),
        query.limit.unwrap_or(DEFAULT_TOPIC_LIMIT),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list topics"))?;

    Ok(Json(rows.into_iter().map(TopicCountResponse::from_db).collect()))
}
