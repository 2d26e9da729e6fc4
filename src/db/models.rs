use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Game {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) topic: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) time_started: PrimitiveDateTime,
    pub(crate) time_ended: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) game_id: String,
    pub(crate) position: i32,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) options: Json<Vec<String>>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TopicCount {
    pub(crate) id: String,
    pub(crate) topic: String,
    pub(crate) count: i32,
}
