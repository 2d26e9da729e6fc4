use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::types::Difficulty;

pub(crate) const MIN_QUESTIONS: u32 = 5;
pub(crate) const MAX_QUESTIONS: u32 = 15;
pub(crate) const MAX_TOPIC_CHARS: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Language {
    Auto,
    English,
    French,
    Arabic,
}

impl Language {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::English => "english",
            Language::French => "french",
            Language::Arabic => "arabic",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "auto" => Some(Language::Auto),
            "english" => Some(Language::English),
            "french" => Some(Language::French),
            "arabic" => Some(Language::Arabic),
            _ => None,
        }
    }
}

/// Body of `POST /api/questions`, and what `POST /api/game` forwards to it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub(crate) struct QuestionsRequest {
    #[validate(range(min = 5, max = 15, message = "Amount must be between 5 and 15 questions"))]
    pub(crate) amount: u32,
    #[validate(length(min = 1, max = 250, message = "Topic must be 1-250 characters long"))]
    pub(crate) topic: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub(crate) struct GeneratedQuestion {
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: String,
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub(crate) answer: String,
    #[validate(length(min = 1, message = "option1 must not be empty"))]
    pub(crate) option1: String,
    #[validate(length(min = 1, message = "option2 must not be empty"))]
    pub(crate) option2: String,
    #[validate(length(min = 1, message = "option3 must not be empty"))]
    pub(crate) option3: String,
}

impl GeneratedQuestion {
    pub(crate) fn distractors(&self) -> [&str; 3] {
        [&self.option1, &self.option2, &self.option3]
    }
}

/// The misspelled `topicSumary` key is part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub(crate) struct QuestionsResponse {
    #[serde(rename = "topicSumary")]
    pub(crate) topic_summary: String,
    #[validate(nested)]
    pub(crate) questions: Vec<GeneratedQuestion>,
}
