use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Game, Question, TopicCount};
use crate::db::types::Difficulty;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameCreatedResponse {
    pub(crate) game_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameQuery {
    #[serde(default)]
    pub(crate) game_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EndGameRequest {
    pub(crate) game_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LimitQuery {
    #[serde(default)]
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) game_id: String,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) options: Vec<String>,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            game_id: question.game_id,
            question: question.question,
            answer: question.answer,
            options: question.options.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameSummaryResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) topic: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) time_started: String,
    pub(crate) time_ended: Option<String>,
}

impl GameSummaryResponse {
    pub(crate) fn from_db(game: Game) -> Self {
        Self {
            id: game.id,
            user_id: game.user_id,
            topic: game.topic,
            difficulty: game.difficulty,
            time_started: format_primitive(game.time_started),
            time_ended: game.time_ended.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GameResponse {
    #[serde(flatten)]
    pub(crate) game: GameSummaryResponse,
    pub(crate) questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GameEnvelope {
    pub(crate) game: GameResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct TopicCountResponse {
    pub(crate) topic: String,
    pub(crate) count: i32,
}

impl TopicCountResponse {
    pub(crate) fn from_db(row: TopicCount) -> Self {
        Self { topic: row.topic, count: row.count }
    }
}
