use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::TopicCount;

/// Upserts the counter for `topic` and returns the new count (1 on first sight).
pub(crate) async fn increment(
    executor: impl sqlx::PgExecutor<'_>,
    topic: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO topic_counts (id, topic, count) VALUES ($1, $2, 1)
         ON CONFLICT (topic) DO UPDATE SET count = topic_counts.count + 1
         RETURNING count",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(topic)
    .fetch_one(executor)
    .await
}

#[cfg(test)]
pub(crate) async fn find_by_topic(
    pool: &PgPool,
    topic: &str,
) -> Result<Option<TopicCount>, sqlx::Error> {
    sqlx::query_as::<_, TopicCount>("SELECT id, topic, count FROM topic_counts WHERE topic = $1")
        .bind(topic)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_popular(pool: &PgPool, limit: i64) -> Result<Vec<TopicCount>, sqlx::Error> {
    sqlx::query_as::<_, TopicCount>(
        "SELECT id, topic, count FROM topic_counts ORDER BY count DESC, topic LIMIT $1",
    )
    .bind(limit.clamp(1, 100))
    .fetch_all(pool)
    .await
}
