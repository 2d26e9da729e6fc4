use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Game;
use crate::db::types::Difficulty;

pub(crate) const COLUMNS: &str = "id, user_id, topic, difficulty, time_started, time_ended";

pub(crate) struct CreateGame<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub topic: &'a str,
    pub difficulty: Difficulty,
    pub time_started: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateGame<'_>,
) -> Result<Game, sqlx::Error> {
    sqlx::query_as::<_, Game>(&format!(
        "INSERT INTO games (id, user_id, topic, difficulty, time_started)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.topic)
    .bind(params.difficulty)
    .bind(params.time_started)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>(&format!("SELECT {COLUMNS} FROM games WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_recent_by_user(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>(&format!(
        "SELECT {COLUMNS} FROM games WHERE user_id = $1 ORDER BY time_started DESC LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit.clamp(1, 100))
    .fetch_all(pool)
    .await
}

/// Stamps the end time once; later calls keep the first stamp.
pub(crate) async fn mark_ended(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>(&format!(
        "UPDATE games SET time_ended = COALESCE(time_ended, $1)
         WHERE id = $2 AND user_id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
