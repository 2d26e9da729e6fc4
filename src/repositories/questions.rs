use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Question;

pub(crate) const COLUMNS: &str = "id, game_id, position, question, answer, options, created_at";

pub(crate) struct NewQuestion {
    pub id: String,
    pub position: i32,
    pub question: String,
    pub answer: String,
    pub options: Vec<String>,
}

pub(crate) async fn insert_many(
    executor: impl sqlx::PgExecutor<'_>,
    game_id: &str,
    questions: Vec<NewQuestion>,
    created_at: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    if questions.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO questions (id, game_id, position, question, answer, options, created_at) ",
    );
    builder.push_values(questions, |mut row, question| {
        row.push_bind(question.id)
            .push_bind(game_id)
            .push_bind(question.position)
            .push_bind(question.question)
            .push_bind(question.answer)
            .push_bind(Json(question.options))
            .push_bind(created_at);
    });

    let result = builder.build().execute(executor).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_by_game(pool: &PgPool, game_id: &str) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE game_id = $1 ORDER BY position"
    ))
    .bind(game_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
pub(crate) async fn count_by_game(pool: &PgPool, game_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE game_id = $1")
        .bind(game_id)
        .fetch_one(pool)
        .await
}
